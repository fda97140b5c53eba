use std::path::Path;

use anyhow::{Context, Result, ensure};
use palette::Srgb;
use serde::Deserialize;
use tracing::warn;

use crate::controller::{ControllerOptions, KeyboardStep};
use crate::error::Error;
use crate::mapper::DEFAULT_MARGIN_PX;
use crate::resize::ResizeOptions;

/// More positions than this become hard to tell apart on a slider.
pub const MAX_ITEMS: usize = 50;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ImageRef {
    /// Asset reference, resolved against the content directory.
    pub path: Option<String>,
    pub alt: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ItemConfig {
    pub image: Option<ImageRef>,
    /// Caption shown below the images; may contain markup.
    pub description: String,
    pub audio: Option<String>,
    /// Text under this item's tick.
    pub label_text: String,
}

impl ItemConfig {
    pub fn image_path(&self) -> Option<&str> {
        self.image
            .as_ref()
            .and_then(|image| image.path.as_deref())
            .filter(|path| !path.trim().is_empty())
    }

    pub fn alt(&self) -> &str {
        self.image.as_ref().map_or("", |image| image.alt.as_str())
    }

    pub fn audio_path(&self) -> Option<&str> {
        self.audio.as_deref().filter(|path| !path.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Behaviour {
    /// 1-based index of the image shown first.
    pub start_image: usize,
    /// Snap the thumb to the nearest tick when a drag ends.
    pub snap: bool,
    pub ticks: bool,
    pub labels: bool,
    /// Background for transparent images, `#rrggbb`.
    pub transparency_replacement_color: String,
    /// Share of the fullscreen height given to the images, in percent.
    pub images_descriptions_ratio: u8,
    pub keyboard_step: KeyboardStep,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            start_image: 1,
            snap: true,
            ticks: false,
            labels: false,
            transparency_replacement_color: "#000000".to_string(),
            images_descriptions_ratio: 70,
            keyboard_step: KeyboardStep::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SliderOptions {
    /// Dead zone at each end of the track.
    pub margin_px: f64,
}

impl Default for SliderOptions {
    fn default() -> Self {
        Self {
            margin_px: DEFAULT_MARGIN_PX,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    pub title: Option<String>,
    pub items: Vec<ItemConfig>,
    pub behaviour: Behaviour,
    pub slider: SliderOptions,
    pub resize: ResizeOptions,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Drop items without an image and cap the list at [`MAX_ITEMS`].
    pub fn sanitize(&mut self) {
        let before = self.items.len();
        self.items.retain(|item| item.image_path().is_some());
        let missing = before - self.items.len();
        if missing > 0 {
            warn!(missing, "items without an image were skipped, please check the settings");
        }
        if self.items.len() > MAX_ITEMS {
            warn!(
                dropped = self.items.len() - MAX_ITEMS,
                "only the first {MAX_ITEMS} items are used"
            );
            self.items.truncate(MAX_ITEMS);
        }
    }

    /// Sanitize and check runtime invariants that serde defaults cannot express.
    pub fn validated(mut self) -> Result<Self> {
        self.sanitize();
        if self.items.len() < 2 {
            return Err(Error::TooFewItems {
                found: self.items.len(),
            }
            .into());
        }
        self.replacement_color()
            .context("invalid behaviour.transparency-replacement-color")?;
        ensure!(
            self.behaviour.images_descriptions_ratio <= 100,
            "behaviour.images-descriptions-ratio must be within 0..=100"
        );
        ensure!(
            self.slider.margin_px.is_finite() && self.slider.margin_px >= 0.0,
            "slider.margin-px must be a non-negative number"
        );
        ensure!(
            self.resize.repetitions > 0,
            "resize.repetitions must be greater than zero"
        );
        Ok(self)
    }

    pub fn replacement_color(&self) -> Result<[u8; 3], Error> {
        let raw = self.behaviour.transparency_replacement_color.trim();
        let rgb: Srgb<u8> = raw
            .parse()
            .map_err(|_| Error::InvalidColor(raw.to_string()))?;
        Ok([rgb.red, rgb.green, rgb.blue])
    }

    /// 0-based start index, clamped to the available items.
    pub fn start_index(&self) -> usize {
        self.behaviour
            .start_image
            .saturating_sub(1)
            .min(self.items.len().saturating_sub(1))
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            snap: self.behaviour.snap,
            ticks: self.behaviour.ticks,
            margin: self.slider.margin_px,
            keyboard_step: self.behaviour.keyboard_step,
            start_index: self.start_index(),
        }
    }

    pub fn label_texts(&self) -> Vec<String> {
        self.items.iter().map(|item| item.label_text.clone()).collect()
    }

    pub fn has_descriptions(&self) -> bool {
        self.items.iter().any(|item| !item.description.is_empty())
    }
}
