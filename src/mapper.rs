//! Pure slider arithmetic.
//!
//! Everything in here is referentially transparent: a raw pixel offset on
//! the track goes in, a [`ContentPosition`] (or a tick offset) comes out.

use std::f64::consts::PI;

use crate::error::Error;

/// Dead zone at each end of the track, in pixels.
pub const DEFAULT_MARGIN_PX: f64 = 5.0;

/// Map `value` from `[lo1, hi1]` onto `[lo2, hi2]`.
///
/// `hi1 == lo1` is a caller bug; the result is NaN in release builds.
pub fn project(value: f64, lo1: f64, hi1: f64, lo2: f64, hi2: f64) -> f64 {
    debug_assert!(hi1 != lo1, "degenerate source range [{lo1}, {hi1}]");
    lo2 + (hi2 - lo2) * (value - lo1) / (hi1 - lo1)
}

/// Clamp `value` into `[lo, hi]`.
pub fn constrain(value: f64, lo: f64, hi: f64) -> f64 {
    hi.min(lo.max(value))
}

/// Laid-out geometry of the slider track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    track_width: f64,
    item_count: usize,
}

impl SliderRange {
    /// `item_count` is the number of *gaps* between items, i.e. `N - 1`.
    pub fn new(track_width: f64, item_count: usize) -> Result<Self, Error> {
        if !track_width.is_finite() || track_width <= 0.0 {
            return Err(Error::InvalidLayout { width: track_width });
        }
        if item_count < 1 {
            return Err(Error::TooFewItems {
                found: item_count + 1,
            });
        }
        Ok(Self {
            track_width,
            item_count,
        })
    }

    pub fn track_width(&self) -> f64 {
        self.track_width
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Clamp a raw offset onto the track.
    pub fn clamp(&self, raw: f64) -> f64 {
        constrain(raw, 0.0, self.track_width)
    }

    /// Normalised position in `[0, 1]`.
    pub fn ratio(&self, raw: f64) -> f64 {
        self.clamp(raw) / self.track_width
    }

    /// Pixel offset of tick `index`.
    pub fn tick_position(&self, index: usize) -> f64 {
        index.min(self.item_count) as f64 * self.track_width / self.item_count as f64
    }
}

/// What the rendering layer shows: `top_index` at `opacity`, blended over
/// its right-hand neighbour at `1 - opacity`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentPosition {
    pub top_index: usize,
    pub opacity: f64,
}

impl ContentPosition {
    /// Fully shows `index`.
    pub fn settled(index: usize) -> Self {
        Self {
            top_index: index,
            opacity: 1.0,
        }
    }

    /// The neighbour being blended in, given `item_total` items.
    pub fn bottom_index(&self, item_total: usize) -> usize {
        (self.top_index + 1).min(item_total.saturating_sub(1))
    }

    /// The item with at least 50% visibility.
    pub fn dominant_index(&self) -> usize {
        let dominant = (self.top_index as f64 + (1.0 - self.opacity)).round();
        dominant.max(0.0) as usize
    }

    /// Like [`Self::dominant_index`] but clamped to an existing item.
    pub fn visible_index(&self, item_total: usize) -> usize {
        self.dominant_index().min(item_total.saturating_sub(1))
    }
}

/// Convert a raw track offset into the top image index and its opacity.
pub fn to_content_position(raw: f64, range: &SliderRange, margin: f64) -> ContentPosition {
    let width = range.track_width();
    let item_count = range.item_count() as f64;

    // A track narrower than both dead zones has no usable span left.
    let margin = if width - 2.0 * margin > 0.0 {
        margin.max(0.0)
    } else {
        0.0
    };

    // Clamped first so both dead zones pin the extreme image.
    let mapped = constrain(
        project(raw, margin, width - margin, 0.0, item_count),
        0.0,
        item_count,
    );
    let top_index = mapped.floor();
    let linear_fraction = constrain(mapped - top_index, 0.0, 1.0);

    // Raised cosine: flat at both ends, so the image near its own tick lingers.
    let opacity = 0.5 * (1.0 - (PI * (1.0 - linear_fraction)).cos());

    ContentPosition {
        top_index: top_index as usize,
        opacity: constrain(opacity, 0.0, 1.0),
    }
}

/// Index of the tick nearest to `ratio`.
pub fn nearest_tick_index(ratio: f64, item_count: usize) -> usize {
    let index = project(ratio, 0.0, 1.0, 0.0, item_count as f64).round();
    constrain(index, 0.0, item_count as f64) as usize
}

/// Pixel offset of the tick nearest to `ratio`.
pub fn nearest_tick_position(ratio: f64, item_count: usize, track_width: f64) -> f64 {
    nearest_tick_index(ratio, item_count) as f64 * track_width / item_count as f64
}

/// Pixel offsets of every tick, left to right.
pub fn tick_positions(range: &SliderRange) -> Vec<f64> {
    (0..=range.item_count())
        .map(|index| range.tick_position(index))
        .collect()
}

/// Ticks bracketing `raw`. Sitting exactly on a tick yields its two
/// neighbours instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborTicks {
    pub previous: usize,
    pub next: usize,
}

pub fn neighbor_ticks(raw: f64, range: &SliderRange) -> NeighborTicks {
    let item_count = range.item_count() as f64;
    let item_position = range.clamp(raw) * item_count / range.track_width();

    let mut previous = item_position.floor();
    let mut next = item_position.ceil();
    if previous == next {
        previous -= 1.0;
        next += 1.0;
    }

    NeighborTicks {
        previous: constrain(previous, 0.0, item_count) as usize,
        next: constrain(next, 0.0, item_count) as usize,
    }
}

/// `aria-valuenow` for a raw offset.
pub fn percentage(raw: f64, range: &SliderRange) -> u8 {
    (range.ratio(raw) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(width: f64, items: usize) -> SliderRange {
        SliderRange::new(width, items - 1).unwrap()
    }

    #[test]
    fn project_hits_both_ends() {
        assert_eq!(project(5.0, 5.0, 195.0, 0.0, 2.0), 0.0);
        assert_eq!(project(195.0, 5.0, 195.0, 0.0, 2.0), 2.0);
        assert!((project(100.0, 5.0, 195.0, 0.0, 2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constrain_is_idempotent() {
        for x in [-10.0, 0.0, 0.3, 1.0, 7.5, 1e9] {
            let once = constrain(x, 0.0, 1.0);
            assert_eq!(constrain(once, 0.0, 1.0), once);
            assert!((0.0..=1.0).contains(&once));
        }
    }

    #[test]
    fn range_rejects_degenerate_layouts() {
        assert!(matches!(
            SliderRange::new(0.0, 2),
            Err(Error::InvalidLayout { .. })
        ));
        assert!(matches!(
            SliderRange::new(200.0, 0),
            Err(Error::TooFewItems { found: 1 })
        ));
    }

    #[test]
    fn every_offset_maps_inside_bounds() {
        let range = range(200.0, 5);
        let mut raw = -20.0;
        while raw <= 220.0 {
            let pos = to_content_position(range.clamp(raw), &range, DEFAULT_MARGIN_PX);
            assert!(pos.top_index <= range.item_count(), "raw {raw}");
            assert!((0.0..=1.0).contains(&pos.opacity), "raw {raw}");
            raw += 0.25;
        }
    }

    #[test]
    fn three_items_on_two_hundred_pixels() {
        let range = range(200.0, 3);

        let start = to_content_position(5.0, &range, 5.0);
        assert_eq!(start.top_index, 0);
        assert!((start.opacity - 1.0).abs() < 1e-9);

        let end = to_content_position(195.0, &range, 5.0);
        assert_eq!(end.top_index, 2);
        assert!((end.opacity - 1.0).abs() < 1e-9);

        let middle = to_content_position(100.0, &range, 5.0);
        assert_eq!(middle.top_index, 1);
        assert!((middle.opacity - 1.0).abs() < 1e-9);

        let quarter = to_content_position(52.5, &range, 5.0);
        assert_eq!(quarter.top_index, 0);
        assert!((quarter.opacity - 0.5).abs() < 0.05);
    }

    #[test]
    fn dead_zone_keeps_first_image() {
        let range = range(200.0, 3);
        for raw in [0.0, 1.0, 4.9] {
            assert_eq!(
                to_content_position(raw, &range, 5.0),
                ContentPosition::settled(0)
            );
        }
    }

    #[test]
    fn dead_zone_keeps_last_image() {
        let range = range(100.0, 12);
        for raw in [95.0, 96.5, 99.0, 100.0, 140.0] {
            assert_eq!(
                to_content_position(raw, &range, 5.0),
                ContentPosition::settled(11),
                "raw {raw}"
            );
        }
    }

    #[test]
    fn cosine_ease_lingers_near_ticks() {
        let range = range(200.0, 2);
        // A quarter of the way from tick 0 to tick 1.
        let raw = 5.0 + 190.0 * 0.25;
        let pos = to_content_position(raw, &range, 5.0);
        assert!(pos.opacity > 0.75, "eased opacity {}", pos.opacity);
    }

    #[test]
    fn narrow_track_ignores_margin() {
        let range = SliderRange::new(8.0, 1).unwrap();
        let pos = to_content_position(8.0, &range, 5.0);
        assert_eq!(pos.top_index, 1);
    }

    #[test]
    fn nearest_tick_rounds_ratio() {
        assert_eq!(nearest_tick_position(0.0, 4, 200.0), 0.0);
        assert_eq!(nearest_tick_position(0.12, 4, 200.0), 0.0);
        assert_eq!(nearest_tick_position(0.13, 4, 200.0), 50.0);
        assert_eq!(nearest_tick_position(1.0, 4, 200.0), 200.0);
        assert_eq!(nearest_tick_index(1.7, 4), 4);
    }

    #[test]
    fn ticks_span_the_track() {
        let range = range(300.0, 4);
        assert_eq!(tick_positions(&range), vec![0.0, 100.0, 200.0, 300.0]);
    }

    #[test]
    fn neighbors_step_off_exact_ticks() {
        let range = range(300.0, 4);
        assert_eq!(
            neighbor_ticks(100.0, &range),
            NeighborTicks {
                previous: 0,
                next: 2
            }
        );
        assert_eq!(
            neighbor_ticks(150.0, &range),
            NeighborTicks {
                previous: 1,
                next: 2
            }
        );
        assert_eq!(
            neighbor_ticks(0.0, &range),
            NeighborTicks {
                previous: 0,
                next: 1
            }
        );
        assert_eq!(
            neighbor_ticks(300.0, &range),
            NeighborTicks {
                previous: 2,
                next: 3
            }
        );
    }

    #[test]
    fn dominant_index_follows_half_visibility() {
        let pos = ContentPosition {
            top_index: 2,
            opacity: 0.4,
        };
        assert_eq!(pos.dominant_index(), 3);
        assert_eq!(pos.bottom_index(5), 3);
        let last = ContentPosition::settled(4);
        assert_eq!(last.bottom_index(5), 4);
        assert_eq!(last.visible_index(5), 4);
    }

    #[test]
    fn percentage_rounds() {
        let range = range(200.0, 3);
        assert_eq!(percentage(0.0, &range), 0);
        assert_eq!(percentage(102.0, &range), 51);
        assert_eq!(percentage(500.0, &range), 100);
    }
}
