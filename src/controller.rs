//! Interaction state machine for the slider.
//!
//! The controller owns the thumb, the current [`ContentPosition`], the set of
//! viewed items and the milestone flags. Every input returns the events it
//! produced; the caller decides how to render them.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::error::Error;
use crate::events::{Key, Milestone, ThumbUpdate};
use crate::mapper::{
    self, ContentPosition, DEFAULT_MARGIN_PX, SliderRange, nearest_tick_index, neighbor_ticks,
    percentage, to_content_position,
};

/// How far a single key press moves the thumb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyboardStep {
    /// Jump to the neighbouring tick.
    #[default]
    Tick,
    /// Move by 1% of the track width.
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerOptions {
    pub snap: bool,
    pub ticks: bool,
    pub margin: f64,
    pub keyboard_step: KeyboardStep,
    /// 0-based, already clamped to an existing item.
    pub start_index: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            snap: true,
            ticks: false,
            margin: DEFAULT_MARGIN_PX,
            keyboard_step: KeyboardStep::Tick,
            start_index: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    /// A pointer went down on the track or thumb and has not been released.
    Dragging(Pointer),
    /// A directional key is held; further key-downs are ignored until it is released.
    KeyHolding(Key),
    /// The thumb is animating towards a tick after a drag.
    Snapping,
}

/// Raw input, in page coordinates where applicable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliderInput {
    PointerDown { x: f64 },
    PointerMove { x: f64 },
    PointerUp,
    TouchStart { x: f64 },
    TouchMove { x: f64 },
    TouchEnd,
    KeyDown(Key),
    KeyUp(Key),
    TickClicked(usize),
    /// A link or rich-text element inside a caption was activated.
    LinkActivated,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliderEvent {
    Thumb(ThumbUpdate),
    Content(ContentPosition),
    /// A discrete move settled on a new item; screen readers should hear about it.
    Announce(usize),
    Milestone(Milestone),
}

#[derive(Debug)]
pub struct InteractionController {
    item_total: usize,
    options: ControllerOptions,
    range: Option<SliderRange>,
    origin: f64,
    state: InteractionState,
    ready: bool,
    thumb: f64,
    /// Thumb position relative to the track width; survives resizes.
    ratio: f64,
    /// Tick the content is settled on, if any.
    resting: Option<usize>,
    last_opacity: Option<f64>,
    dominant: Option<usize>,
    announced: Option<usize>,
    viewed: BTreeSet<usize>,
    experienced: bool,
    completed: bool,
}

impl InteractionController {
    pub fn new(item_total: usize, options: ControllerOptions) -> Result<Self, Error> {
        if item_total < 2 {
            return Err(Error::TooFewItems { found: item_total });
        }
        let item_count = item_total - 1;
        let start_index = options.start_index.min(item_count);
        Ok(Self {
            item_total,
            options: ControllerOptions {
                start_index,
                ..options
            },
            range: None,
            origin: 0.0,
            state: InteractionState::Idle,
            ready: false,
            thumb: 0.0,
            ratio: start_index as f64 / item_count as f64,
            resting: Some(start_index),
            last_opacity: None,
            dominant: None,
            announced: Some(start_index),
            viewed: BTreeSet::new(),
            experienced: false,
            completed: false,
        })
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn item_total(&self) -> usize {
        self.item_total
    }

    pub fn range(&self) -> Option<&SliderRange> {
        self.range.as_ref()
    }

    pub fn thumb_position(&self) -> f64 {
        self.thumb
    }

    /// Item with at least 50% visibility in the last emitted content.
    pub fn current_index(&self) -> usize {
        self.dominant
            .unwrap_or(self.options.start_index)
            .min(self.item_total - 1)
    }

    pub fn viewed(&self) -> &BTreeSet<usize> {
        &self.viewed
    }

    /// Pixel offsets of the ticks, empty until laid out.
    pub fn tick_positions(&self) -> Vec<f64> {
        self.range
            .as_ref()
            .map(mapper::tick_positions)
            .unwrap_or_default()
    }

    /// Enable the slider once every asset has loaded.
    pub fn set_ready(&mut self) -> Vec<SliderEvent> {
        let mut events = Vec::new();
        if !self.ready {
            debug!("slider enabled");
            self.ready = true;
            self.first_render(&mut events);
        }
        events
    }

    /// New track geometry from the host. `origin` is the page x of the
    /// track's left edge.
    pub fn set_layout(&mut self, origin: f64, width: f64) -> Result<Vec<SliderEvent>, Error> {
        let range = SliderRange::new(width, self.item_total - 1)?;
        self.range = Some(range);
        self.origin = origin;

        let mut events = Vec::new();
        if self.experienced {
            // Keep the ratio, only the pixels change.
            self.thumb = range.clamp(self.ratio * width);
            events.push(SliderEvent::Thumb(self.thumb_update(false)));
        } else {
            self.first_render(&mut events);
        }
        Ok(events)
    }

    /// The snap animation finished.
    pub fn settle_snap(&mut self) {
        if self.state == InteractionState::Snapping {
            self.transition(InteractionState::Idle);
        }
    }

    pub fn handle(&mut self, input: SliderInput) -> Vec<SliderEvent> {
        let mut events = Vec::new();
        let Some(range) = self.range.filter(|_| self.ready) else {
            trace!(?input, "slider disabled, ignoring input");
            return events;
        };

        match input {
            SliderInput::PointerDown { x } => self.begin_drag(Pointer::Mouse, x, &range, &mut events),
            SliderInput::TouchStart { x } => self.begin_drag(Pointer::Touch, x, &range, &mut events),
            SliderInput::PointerMove { x } | SliderInput::TouchMove { x } => {
                if matches!(self.state, InteractionState::Dragging(_)) {
                    self.drag_to(x, &range, &mut events);
                }
            }
            SliderInput::PointerUp | SliderInput::TouchEnd => {
                // A release without a press on the slider is somebody else's gesture.
                if matches!(self.state, InteractionState::Dragging(_)) {
                    self.release_drag(&range, &mut events);
                }
            }
            SliderInput::KeyDown(key) => self.key_down(key, &range, &mut events),
            SliderInput::KeyUp(key) => {
                if self.state == InteractionState::KeyHolding(key) {
                    self.transition(InteractionState::Idle);
                    self.finish_gesture(&mut events);
                }
            }
            SliderInput::TickClicked(index) => {
                if self.options.ticks && self.is_idle() && index <= range.item_count() {
                    self.settle_on(index, &range, &mut events);
                    self.finish_gesture(&mut events);
                }
            }
            SliderInput::LinkActivated => self.milestone(Milestone::Interacted, &mut events),
        }
        events
    }

    fn is_idle(&self) -> bool {
        matches!(
            self.state,
            InteractionState::Idle | InteractionState::Snapping
        )
    }

    fn transition(&mut self, to: InteractionState) {
        if self.state != to {
            debug!(from = ?self.state, to = ?to, "slider state change");
            self.state = to;
        }
    }

    fn first_render(&mut self, events: &mut Vec<SliderEvent>) {
        let Some(range) = self.range.filter(|_| self.ready && !self.experienced) else {
            return;
        };
        self.settle_on(self.options.start_index, &range, events);
        self.experienced = true;
        self.milestone(Milestone::Experienced, events);
    }

    fn begin_drag(
        &mut self,
        pointer: Pointer,
        x: f64,
        range: &SliderRange,
        events: &mut Vec<SliderEvent>,
    ) {
        if !self.is_idle() {
            return;
        }
        self.transition(InteractionState::Dragging(pointer));
        self.drag_to(x, range, events);
    }

    fn drag_to(&mut self, x: f64, range: &SliderRange, events: &mut Vec<SliderEvent>) {
        self.move_thumb(x - self.origin, range, false, events);
        self.resting = None;
        let position = to_content_position(self.thumb, range, self.options.margin);
        self.update_content(position, events);
    }

    fn release_drag(&mut self, range: &SliderRange, events: &mut Vec<SliderEvent>) {
        if self.options.snap {
            self.transition(InteractionState::Snapping);
            let index = nearest_tick_index(self.ratio, range.item_count());
            self.settle_on(index, range, events);
        } else {
            self.transition(InteractionState::Idle);
        }
        self.finish_gesture(events);
    }

    fn key_down(&mut self, key: Key, range: &SliderRange, events: &mut Vec<SliderEvent>) {
        if !self.is_idle() || key == Key::Other {
            // Key repeat, or a second key while one is held.
            return;
        }
        self.transition(InteractionState::KeyHolding(key));

        let item_count = range.item_count();
        match (key, self.options.keyboard_step) {
            (Key::Home, _) => self.settle_on(0, range, events),
            (Key::End, _) => self.settle_on(item_count, range, events),
            (_, KeyboardStep::Tick) => {
                let target = match (self.resting, backwards(key)) {
                    (Some(index), true) => index.saturating_sub(1),
                    (Some(index), false) => (index + 1).min(item_count),
                    (None, true) => neighbor_ticks(self.thumb, range).previous,
                    (None, false) => neighbor_ticks(self.thumb, range).next,
                };
                self.settle_on(target, range, events);
            }
            (_, KeyboardStep::Percent) => {
                let step = 0.01 * range.track_width();
                let delta = if backwards(key) { -step } else { step };
                self.move_thumb(self.thumb + delta, range, false, events);
                self.resting = None;
                let position = to_content_position(self.thumb, range, self.options.margin);
                self.update_content(position, events);
            }
        }
        self.announce_if_moved(events);
    }

    /// Move the thumb to tick `index` and show that item fully.
    fn settle_on(&mut self, index: usize, range: &SliderRange, events: &mut Vec<SliderEvent>) {
        let animate = self.experienced;
        self.move_thumb(range.tick_position(index), range, animate, events);
        self.resting = Some(index);
        self.update_content(ContentPosition::settled(index), events);
    }

    fn move_thumb(
        &mut self,
        raw: f64,
        range: &SliderRange,
        animate: bool,
        events: &mut Vec<SliderEvent>,
    ) {
        self.thumb = range.clamp(raw);
        self.ratio = range.ratio(self.thumb);
        events.push(SliderEvent::Thumb(self.thumb_update(animate)));
    }

    fn thumb_update(&self, animate: bool) -> ThumbUpdate {
        let percentage = self
            .range
            .as_ref()
            .map_or(0, |range| percentage(self.thumb, range));
        ThumbUpdate {
            position: self.thumb,
            percentage,
            animate,
        }
    }

    /// Forward a content change unless it is a near-duplicate during a drag.
    fn update_content(&mut self, position: ContentPosition, events: &mut Vec<SliderEvent>) {
        let opacity = (position.opacity * 10.0).round() / 10.0;
        let dragging = matches!(self.state, InteractionState::Dragging(_));
        if dragging
            && self.last_opacity == Some(opacity)
            && (opacity != 1.0 || self.dominant == Some(position.top_index))
        {
            trace!(
                top_index = position.top_index,
                opacity, "suppressing redundant content update"
            );
            return;
        }

        let position = ContentPosition {
            top_index: position.top_index,
            opacity,
        };
        self.last_opacity = Some(opacity);
        let dominant = position.visible_index(self.item_total);
        self.dominant = Some(dominant);
        if !self.completed {
            self.viewed.insert(dominant);
        }
        events.push(SliderEvent::Content(position));
    }

    fn announce_if_moved(&mut self, events: &mut Vec<SliderEvent>) {
        let current = self.current_index();
        if self.announced != Some(current) {
            self.announced = Some(current);
            events.push(SliderEvent::Announce(current));
        }
    }

    fn finish_gesture(&mut self, events: &mut Vec<SliderEvent>) {
        self.announce_if_moved(events);
        self.milestone(Milestone::Interacted, events);
        if !self.completed && self.viewed.len() == self.item_total {
            self.completed = true;
            self.milestone(Milestone::Completed, events);
        }
    }

    fn milestone(&self, milestone: Milestone, events: &mut Vec<SliderEvent>) {
        debug!(verb = milestone.verb(), "milestone reached");
        events.push(SliderEvent::Milestone(milestone));
    }
}

fn backwards(key: Key) -> bool {
    matches!(key, Key::Left | Key::PageUp)
}
