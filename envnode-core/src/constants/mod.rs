//! Constants for envnode Core
//!
//! Every numeric limit the engine relies on lives here, grouped by domain:
//! - **Buffers**: ring and window sizes, drain batch size
//! - **Sensors**: noise floors, gas curves, gravity band, battery thresholds
//! - **Time**: sampling and publish intervals
//!
//! Values match the deployed firmware so that payloads and alert behaviour stay
//! comparable across node generations.

/// Buffer sizes and memory constraints for the offline store and windows.
pub mod buffers;

/// Sensor characteristics used by the anomaly, spike and battery checks.
pub mod sensors;

/// Time-related constants for intervals.
pub mod time;

pub use buffers::{BUFFER_BATCH_SIZE, DEFAULT_BUFFER_CAPACITY, HISTORY_SIZE, MAX_BUFFER_SIZE};

pub use sensors::{
    DEFAULT_ACCEL_THRESHOLD_G, DEFAULT_ANOMALY_MULTIPLIER, DEFAULT_SOUND_THRESHOLD,
    LOW_BATTERY_THRESHOLD_PCT, BATTERY_RECOVERED_THRESHOLD_PCT,
    MIN_GAS_STD_DEV, MIN_TEMP_STD_DEV,
};

pub use time::{DEFAULT_PUBLISH_INTERVAL_MS, DEFAULT_SENSOR_INTERVAL_MS};
