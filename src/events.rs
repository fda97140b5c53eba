use crate::mapper::ContentPosition;

/// Analytics signals reported to the host's tracking hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Milestone {
    /// First successful content render.
    Experienced,
    /// A gesture ended, or a link inside a caption was activated.
    Interacted,
    /// Every item has been at least 50% visible once.
    Completed,
}

impl Milestone {
    /// xAPI verb for this milestone.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Experienced => "experienced",
            Self::Interacted => "interacted",
            Self::Completed => "completed",
        }
    }
}

/// Keys the slider thumb reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Key {
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    /// Anything else; ignored.
    #[serde(other)]
    Other,
}

/// Where the thumb should be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbUpdate {
    /// Offset along the track in pixels.
    pub position: f64,
    /// `aria-valuenow`, 0..=100.
    pub percentage: u8,
    /// Slide instead of jumping.
    pub animate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCommand {
    StopAll,
    Start(usize),
}

/// Caption cross-fade, mirrors the image blend.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionFrame {
    pub top_index: usize,
    pub top_opacity: f64,
    pub bottom_index: usize,
    pub bottom_opacity: f64,
    /// Text of the caption with more than half visibility.
    pub current_text: String,
}

/// Everything the presentation layer subscribes to.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// Static "need at least two images" notice; nothing else follows.
    Misconfigured { notice: String },
    /// All assets are in; the slider is enabled.
    Ready,
    Thumb(ThumbUpdate),
    Content(ContentPosition),
    Caption(CaptionFrame),
    Audio(AudioCommand),
    /// Text for the screen reader live region.
    Announce(String),
    Milestone(Milestone),
    Fullscreen(bool),
}

/// Ask the host to run another layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeRequest;
