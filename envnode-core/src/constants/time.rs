//! Time-Related Constants
//!
//! Intervals carried in `Config` for the scheduling collaborator. The core
//! itself is tick driven and never sleeps.

/// Default sensor sampling interval (milliseconds).
pub const DEFAULT_SENSOR_INTERVAL_MS: u32 = 1000;

/// Default live publish interval (milliseconds).
pub const DEFAULT_PUBLISH_INTERVAL_MS: u32 = 5000;
