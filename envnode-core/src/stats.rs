//! Fixed-Size Sliding Windows for Per-Channel Statistics
//!
//! ## Overview
//!
//! Each monitored channel keeps its last `N` samples in a plain array that is
//! reused cyclically. The window answers two questions on demand, mean and
//! population standard deviation, which the anomaly detector turns into a
//! z-score.
//!
//! ## Valid Portion
//!
//! Until the cursor wraps for the first time only the slots before it hold
//! real samples. Statistics are computed over exactly those slots, never over
//! the zero-initialised tail:
//!
//! ```text
//! SlidingWindowStats<5> after 3 pushes:
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │ 20  │ 21  │ 22  │  ·  │  ·  │   valid = 3, filled = false
//! └─────┴─────┴─────┴─────┴─────┘
//!                    ↑ cursor
//!
//! after 7 pushes:
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │ 25  │ 26  │ 22  │ 23  │ 24  │   valid = 5, filled = true
//! └─────┴─────┴─────┴─────┴─────┘
//!              ↑ cursor (oldest)
//! ```
//!
//! ## Numeric Policy
//!
//! The window does not inspect values. A NaN pushed here poisons mean and
//! standard deviation until it is overwritten; filtering happens before
//! ingestion (see [`crate::node::SampleFilter`]).
//!
//! ```rust
//! use envnode_core::stats::SlidingWindowStats;
//!
//! let mut window: SlidingWindowStats<4> = SlidingWindowStats::new();
//! for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
//!     window.update(v);
//! }
//! // Only the last four remain: 5, 5, 7, 9
//! assert_eq!(window.mean(), 6.5);
//! ```

use crate::reading::{Channel, Reading};

/// Ring of the most recent `N` samples of one channel
///
/// ## Internal Invariants
///
/// - `cursor < N`
/// - `filled` becomes true the first time `cursor` wraps to zero and stays true
/// - valid samples: `N` when filled, otherwise `data[..cursor]`
#[derive(Debug, Clone)]
pub struct SlidingWindowStats<const N: usize> {
    /// Sample storage, reused cyclically
    data: [f32; N],

    /// Slot the next sample is written to
    cursor: usize,

    /// Whether every slot holds a real sample
    filled: bool,
}

impl<const N: usize> SlidingWindowStats<N> {
    /// Creates an empty window
    ///
    /// Const so windows can live in statics on targets without an allocator.
    pub const fn new() -> Self {
        Self {
            data: [0.0; N],
            cursor: 0,
            filled: false,
        }
    }

    /// Appends a sample, overwriting the oldest once the window is full
    pub fn update(&mut self, value: f32) {
        self.data[self.cursor] = value;
        self.cursor = (self.cursor + 1) % N;

        if self.cursor == 0 {
            self.filled = true;
        }
    }

    /// Number of valid samples
    pub fn len(&self) -> usize {
        if self.filled { N } else { self.cursor }
    }

    /// No samples yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every slot holds a sample
    pub fn is_full(&self) -> bool {
        self.filled
    }

    /// Arithmetic mean of the valid samples, 0 when empty
    pub fn mean(&self) -> f32 {
        let count = self.len();
        if count == 0 {
            return 0.0;
        }

        let sum: f32 = self.valid().iter().sum();
        sum / count as f32
    }

    /// Population standard deviation of the valid samples, 0 when empty
    ///
    /// Divides by `count`, not `count - 1`: the window is the whole population
    /// the detector compares against.
    pub fn std_dev(&self) -> f32 {
        self.spread(self.mean())
    }

    /// Mean and standard deviation in one pass over the mean
    pub fn summary(&self) -> WindowSummary {
        let mean = self.mean();
        WindowSummary {
            mean,
            std_dev: self.spread(mean),
            samples: self.len(),
        }
    }

    fn spread(&self, mean: f32) -> f32 {
        let count = self.len();
        if count == 0 {
            return 0.0;
        }

        let sum_squared_diff: f32 = self
            .valid()
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum();

        libm::sqrtf(sum_squared_diff / count as f32)
    }

    /// Most recent sample
    pub fn last(&self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }
        let idx = if self.cursor == 0 { N - 1 } else { self.cursor - 1 };
        Some(self.data[idx])
    }

    /// Iterate samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        let start = if self.filled { self.cursor } else { 0 };
        (0..self.len()).map(move |i| self.data[(start + i) % N])
    }

    /// Forget all samples
    pub fn clear(&mut self) {
        self.cursor = 0;
        self.filled = false;
    }

    /// Physical slots holding real samples (order irrelevant for moments)
    fn valid(&self) -> &[f32] {
        &self.data[..self.len()]
    }
}

impl<const N: usize> Default for SlidingWindowStats<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of a window's moments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSummary {
    /// Arithmetic mean
    pub mean: f32,
    /// Population standard deviation
    pub std_dev: f32,
    /// Valid samples the moments were computed over
    pub samples: usize,
}

/// One window per monitored channel
///
/// Each window owns its own cursor, so a channel that skips a tick (filtered
/// NaN, no microphone samples) does not shift the others.
#[derive(Debug, Clone)]
pub struct ChannelHistories<const N: usize> {
    windows: [SlidingWindowStats<N>; Channel::COUNT],
}

impl<const N: usize> ChannelHistories<N> {
    /// Empty windows for every channel
    pub const fn new() -> Self {
        Self {
            windows: [
                SlidingWindowStats::new(),
                SlidingWindowStats::new(),
                SlidingWindowStats::new(),
                SlidingWindowStats::new(),
                SlidingWindowStats::new(),
            ],
        }
    }

    /// Window of one channel
    pub fn get(&self, channel: Channel) -> &SlidingWindowStats<N> {
        &self.windows[channel.index()]
    }

    /// Push a single channel value
    pub fn update(&mut self, channel: Channel, value: f32) {
        self.windows[channel.index()].update(value);
    }

    /// Push every channel of a snapshot that `admit` accepts
    ///
    /// Returns the number of channels updated.
    pub fn ingest<F>(&mut self, reading: &Reading, mut admit: F) -> usize
    where
        F: FnMut(Channel, f32) -> bool,
    {
        let mut updated = 0;
        for channel in Channel::ALL {
            let value = reading.value(channel);
            if admit(channel, value) {
                self.update(channel, value);
                updated += 1;
            }
        }
        updated
    }

    /// Empties every window
    pub fn clear(&mut self) {
        for window in &mut self.windows {
            window.clear();
        }
    }
}

impl<const N: usize> Default for ChannelHistories<N> {
    fn default() -> Self {
        Self::new()
    }
}
