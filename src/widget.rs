//! The widget as the host sees it.
//!
//! [`Agamotto`] wires the interaction controller to captions, audio and the
//! host hooks, and republishes everything as [`WidgetEvent`]s for the
//! rendering layer.

use tracing::{debug, info, warn};

use crate::audio::AudioTracker;
use crate::captions::{self, Captions};
use crate::config::Configuration;
use crate::controller::{InteractionController, SliderEvent, SliderInput};
use crate::error::Error;
use crate::events::{AudioCommand, Milestone, WidgetEvent};
use crate::observer::{Observers, SubscriptionId};
use crate::tasks::loader::LoadedAssets;

pub const DEFAULT_TITLE: &str = "Agamotto";
pub const TOO_FEW_ITEMS_NOTICE: &str = "I really need at least two images :-)";

/// Services provided by the embedding host.
pub trait Host {
    /// Report an analytics statement.
    fn trigger_xapi(&mut self, milestone: Milestone);
    /// Put `text` into the screen reader live region.
    fn read(&mut self, text: &str);
    fn notify_resize(&mut self) {}
    fn enter_fullscreen(&mut self) {}
    fn exit_fullscreen(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    /// Fewer than two usable items; only a static notice is shown.
    Misconfigured,
    /// Waiting for every asset; the slider is disabled.
    Loading,
    Ready,
}

/// Context reported alongside confusion feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportContext {
    pub kind: &'static str,
    /// 1-based index of the dominant image.
    pub value: usize,
}

#[derive(Debug)]
pub struct Agamotto<H: Host> {
    config: Configuration,
    content_id: u64,
    host: H,
    state: WidgetState,
    controller: Option<InteractionController>,
    captions: Captions,
    audio: AudioTracker,
    observers: Observers<WidgetEvent>,
    fullscreen: bool,
}

impl<H: Host> Agamotto<H> {
    pub fn new(mut config: Configuration, content_id: u64, host: H) -> Self {
        config.sanitize();
        let controller =
            match InteractionController::new(config.items.len(), config.controller_options()) {
                Ok(controller) => Some(controller),
                Err(err) => {
                    warn!(content_id, "{err}");
                    None
                }
            };
        let state = if controller.is_some() {
            WidgetState::Loading
        } else {
            WidgetState::Misconfigured
        };
        let captions = Captions::new(
            config
                .items
                .iter()
                .map(|item| item.description.clone())
                .collect(),
        );
        let audio = AudioTracker::new(vec![false; config.items.len()]);
        Self {
            config,
            content_id,
            host,
            state,
            controller,
            captions,
            audio,
            observers: Observers::new(),
            fullscreen: false,
        }
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&WidgetEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Publish the initial state to subscribers.
    pub fn mount(&mut self) {
        if self.state == WidgetState::Misconfigured {
            self.observers.publish(&WidgetEvent::Misconfigured {
                notice: TOO_FEW_ITEMS_NOTICE.to_string(),
            });
        }
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn content_id(&self) -> u64 {
        self.content_id
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn controller(&self) -> Option<&InteractionController> {
        self.controller.as_ref()
    }

    pub fn title(&self) -> &str {
        self.config
            .title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(DEFAULT_TITLE)
    }

    pub fn context(&self) -> ReportContext {
        let index = self
            .controller
            .as_ref()
            .map_or(0, InteractionController::current_index);
        ReportContext {
            kind: "image",
            value: index + 1,
        }
    }

    /// Background for transparent images; black if the configured colour is unusable.
    pub fn replacement_color(&self) -> [u8; 3] {
        self.config.replacement_color().unwrap_or_else(|err| {
            warn!("{err}, falling back to black");
            [0, 0, 0]
        })
    }

    pub fn tick_positions(&self) -> Vec<f64> {
        match &self.controller {
            Some(controller) if self.config.behaviour.ticks => controller.tick_positions(),
            _ => Vec::new(),
        }
    }

    pub fn labels(&self) -> Option<Vec<String>> {
        self.config
            .behaviour
            .labels
            .then(|| self.config.label_texts())
    }

    pub fn has_audio(&self) -> bool {
        self.audio.any()
    }

    /// Every asset loaded: enable the slider.
    pub fn assets_loaded(&mut self, assets: &LoadedAssets) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        if self.state == WidgetState::Ready {
            return;
        }
        let mut has_audio = assets.has_audio();
        has_audio.resize(self.config.items.len(), false);
        self.audio = AudioTracker::new(has_audio);
        self.state = WidgetState::Ready;
        let events = controller.set_ready();
        self.observers.publish(&WidgetEvent::Ready);
        self.dispatch(events);
        self.host.notify_resize();
    }

    /// Preloading failed. The widget keeps its spinner; there is no retry.
    pub fn assets_failed(&mut self, err: &Error) {
        warn!(content_id = self.content_id, "{err}; staying in loading state");
    }

    /// The host laid the slider out anew.
    pub fn layout(&mut self, origin: f64, track_width: f64) -> Result<(), Error> {
        let Some(controller) = self.controller.as_mut() else {
            return Ok(());
        };
        let events = controller.set_layout(origin, track_width)?;
        self.dispatch(events);
        Ok(())
    }

    pub fn input(&mut self, input: SliderInput) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        let events = controller.handle(input);
        self.dispatch(events);
    }

    pub fn snap_finished(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.settle_snap();
        }
    }

    pub fn mute(&mut self) {
        let commands = self.audio.mute();
        self.publish_audio(commands);
    }

    pub fn unmute(&mut self) {
        let commands = self.audio.unmute();
        self.publish_audio(commands);
    }

    /// Visible fraction of the widget changed.
    pub fn visibility(&mut self, ratio: f64) {
        let commands = self.audio.on_visibility(ratio);
        self.publish_audio(commands);
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// `None` toggles.
    pub fn set_fullscreen(&mut self, enter: Option<bool>) {
        let enter = enter.unwrap_or(!self.fullscreen);
        if enter == self.fullscreen {
            return;
        }
        self.fullscreen = enter;
        if enter {
            self.host.enter_fullscreen();
        } else {
            self.host.exit_fullscreen();
        }
        self.observers.publish(&WidgetEvent::Fullscreen(enter));
    }

    /// Maximum image height in fullscreen when `available` pixels are left
    /// after the title and the slider.
    pub fn fullscreen_image_height(&self, available: f64) -> f64 {
        if self.captions.any() {
            available * f64::from(self.config.behaviour.images_descriptions_ratio) / 100.0
        } else {
            available
        }
    }

    fn dispatch(&mut self, events: Vec<SliderEvent>) {
        for event in events {
            match event {
                SliderEvent::Thumb(thumb) => self.observers.publish(&WidgetEvent::Thumb(thumb)),
                SliderEvent::Content(position) => {
                    self.observers.publish(&WidgetEvent::Content(position));
                    if self.captions.any() {
                        let frame = self.captions.frame(&position);
                        self.observers.publish(&WidgetEvent::Caption(frame));
                    }
                    let commands = self.audio.on_content(&position);
                    self.publish_audio(commands);
                }
                SliderEvent::Announce(index) => {
                    let alt = self
                        .config
                        .items
                        .get(index)
                        .map_or("", |item| item.alt());
                    let text = captions::announcement(None, alt, self.captions.text(index));
                    debug!(index, %text, "announcing");
                    self.host.read(&text);
                    self.observers.publish(&WidgetEvent::Announce(text));
                }
                SliderEvent::Milestone(milestone) => {
                    info!(content_id = self.content_id, verb = milestone.verb(), "xAPI");
                    self.host.trigger_xapi(milestone);
                    self.observers.publish(&WidgetEvent::Milestone(milestone));
                }
            }
        }
    }

    fn publish_audio(&mut self, commands: Vec<AudioCommand>) {
        for command in commands {
            self.observers.publish(&WidgetEvent::Audio(command));
        }
    }
}
