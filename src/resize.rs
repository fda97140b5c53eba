//! Convergence check for the host's resize cascade.
//!
//! Images take a few layout passes to settle. After every pass the shell
//! records the measured image area; the monitor answers whether another pass
//! should be scheduled.

use std::collections::{BTreeSet, VecDeque};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ResizeOptions {
    /// Delay before a follow-up pass; a newer measurement replaces a pending one.
    #[serde(with = "humantime_serde")]
    pub cooling_period: Duration,
    /// Number of recent measurements considered.
    pub repetitions: usize,
    /// Consecutive zero-height windows tolerated before giving up.
    pub zero_height_repetitions: usize,
}

impl ResizeOptions {
    const fn default_cooling_period() -> Duration {
        Duration::from_millis(75)
    }

    const fn default_repetitions() -> usize {
        3
    }

    const fn default_zero_height_repetitions() -> usize {
        50
    }
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            cooling_period: Self::default_cooling_period(),
            repetitions: Self::default_repetitions(),
            zero_height_repetitions: Self::default_zero_height_repetitions(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResizeMonitor {
    options: ResizeOptions,
    previous: VecDeque<Size>,
    zero_height_streak: usize,
}

impl ResizeMonitor {
    pub fn new(options: ResizeOptions) -> Self {
        Self {
            previous: VecDeque::with_capacity(options.repetitions + 1),
            options,
            zero_height_streak: 0,
        }
    }

    pub fn options(&self) -> &ResizeOptions {
        &self.options
    }

    /// Record a measurement and decide whether to resize again.
    pub fn record(&mut self, size: Size) -> bool {
        self.previous.push_back(size);
        while self.previous.len() > self.options.repetitions {
            self.previous.pop_front();
        }
        let needed = self.resize_needed();
        debug!(?size, needed, "resize pass measured");
        needed
    }

    fn resize_needed(&mut self) -> bool {
        // Too few samples to tell yet.
        if self.previous.len() < self.options.repetitions {
            return true;
        }

        // A zero height is usually a transient layout glitch; retry, but not forever.
        if self.previous.iter().any(|size| size.height == 0) {
            self.zero_height_streak += 1;
            if self.zero_height_streak < self.options.zero_height_repetitions {
                return true;
            }
            self.zero_height_streak = 0;
        } else {
            self.zero_height_streak = 0;
        }

        // Keep going only while every recent pass produced a different size;
        // a repeat means the layout oscillates or has settled.
        let distinct: BTreeSet<&Size> = self.previous.iter().collect();
        distinct.len() == self.options.repetitions
    }
}
