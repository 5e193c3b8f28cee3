//! Time handling for the node
//!
//! The core never reads a clock itself: every `Reading` arrives stamped by the
//! acquisition collaborator. This module only fixes the timestamp unit and
//! offers a clock abstraction for the collaborators and tests that produce
//! readings.

/// Timestamp in milliseconds since device boot (monotonic)
pub type Timestamp = u64;

/// Source of time for the acquisition side
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// Manually advanced clock for host simulation and tests
#[derive(Debug, Clone, Default)]
pub struct MockTimeSource {
    timestamp: Timestamp,
}

impl MockTimeSource {
    /// Clock reading `start`
    pub fn new(start: Timestamp) -> Self {
        Self { timestamp: start }
    }

    /// Jumps to `timestamp`
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Moves forward by `ms`, saturating
    pub fn advance(&mut self, ms: u64) {
        self.timestamp = self.timestamp.saturating_add(ms);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}
