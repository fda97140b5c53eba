use tracing::debug;

use crate::events::AudioCommand;
use crate::mapper::ContentPosition;

/// Tracks which item's audio should be playing.
///
/// At most one track is active: the one belonging to the dominant item.
/// Playback only starts while the widget is unmuted and fully visible.
#[derive(Debug, Clone)]
pub struct AudioTracker {
    has_audio: Vec<bool>,
    active: Option<usize>,
    muted: bool,
    visible: bool,
}

impl AudioTracker {
    pub fn new(has_audio: Vec<bool>) -> Self {
        Self {
            has_audio,
            active: None,
            muted: false,
            visible: false,
        }
    }

    /// True if at least one item carries audio.
    pub fn any(&self) -> bool {
        self.has_audio.iter().any(|&audio| audio)
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn on_content(&mut self, position: &ContentPosition) -> Vec<AudioCommand> {
        let index = position.visible_index(self.has_audio.len());
        if self.active == Some(index) {
            return Vec::new();
        }
        self.active = Some(index);
        if self.muted {
            return Vec::new();
        }

        let mut commands = vec![AudioCommand::StopAll];
        commands.extend(self.start(index));
        commands
    }

    pub fn mute(&mut self) -> Vec<AudioCommand> {
        self.muted = true;
        vec![AudioCommand::StopAll]
    }

    pub fn unmute(&mut self) -> Vec<AudioCommand> {
        self.muted = false;
        self.active.and_then(|index| self.start(index)).into_iter().collect()
    }

    /// `ratio` is the visible fraction of the widget, as an intersection observer reports it.
    pub fn on_visibility(&mut self, ratio: f64) -> Vec<AudioCommand> {
        if ratio <= 0.0 {
            self.visible = false;
            return vec![AudioCommand::StopAll];
        }
        if ratio >= 1.0 && !self.visible {
            self.visible = true;
            if !self.muted {
                return self.active.and_then(|index| self.start(index)).into_iter().collect();
            }
        }
        Vec::new()
    }

    fn start(&self, index: usize) -> Option<AudioCommand> {
        if !self.visible || !self.has_audio.get(index).copied().unwrap_or(false) {
            return None;
        }
        debug!(index, "starting audio");
        Some(AudioCommand::Start(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible(has_audio: Vec<bool>) -> AudioTracker {
        let mut tracker = AudioTracker::new(has_audio);
        tracker.on_visibility(1.0);
        tracker
    }

    #[test]
    fn last_item_is_never_overshot() {
        let mut tracker = visible(vec![false, false, true]);
        let fully_past = ContentPosition {
            top_index: 2,
            opacity: 0.0,
        };
        assert_eq!(
            tracker.on_content(&fully_past),
            vec![AudioCommand::StopAll, AudioCommand::Start(2)]
        );
        assert_eq!(tracker.active(), Some(2));
    }

    #[test]
    fn switching_items_restarts_audio() {
        let mut tracker = visible(vec![true, false, true]);
        assert_eq!(
            tracker.on_content(&ContentPosition::settled(0)),
            vec![AudioCommand::StopAll, AudioCommand::Start(0)]
        );
        // Same dominant item: nothing to do.
        let blended = ContentPosition {
            top_index: 0,
            opacity: 0.7,
        };
        assert!(tracker.on_content(&blended).is_empty());
        // Item without audio only stops the previous one.
        assert_eq!(
            tracker.on_content(&ContentPosition::settled(1)),
            vec![AudioCommand::StopAll]
        );
    }

    #[test]
    fn muted_tracker_remembers_active_item() {
        let mut tracker = visible(vec![true, true]);
        tracker.mute();
        assert!(tracker.on_content(&ContentPosition::settled(1)).is_empty());
        assert_eq!(tracker.active(), Some(1));
        assert_eq!(tracker.unmute(), vec![AudioCommand::Start(1)]);
    }

    #[test]
    fn hidden_widget_stays_silent() {
        let mut tracker = AudioTracker::new(vec![true, true]);
        assert_eq!(
            tracker.on_content(&ContentPosition::settled(0)),
            vec![AudioCommand::StopAll]
        );
        assert_eq!(tracker.on_visibility(1.0), vec![AudioCommand::Start(0)]);
        assert_eq!(tracker.on_visibility(0.0), vec![AudioCommand::StopAll]);
        assert!(tracker.on_visibility(0.5).is_empty());
    }

    #[test]
    fn any_reports_audio_presence() {
        assert!(!AudioTracker::new(vec![false, false]).any());
        assert!(AudioTracker::new(vec![false, true]).any());
    }
}
