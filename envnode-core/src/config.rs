//! Runtime configuration
//!
//! `Config` is loaded once at boot by the persistence collaborator and may be
//! changed between ticks by a remote update. The core re-reads it every tick
//! instead of caching values, so an update takes effect on the next cycle.
//!
//! Remote updates merge field by field: [`ConfigUpdate::apply`] skips a value
//! outside its range and keeps every other field of the same message.
//!
//! ```rust
//! use envnode_core::config::{Config, ConfigUpdate};
//!
//! let mut config = Config::default();
//! let update = ConfigUpdate {
//!     buffer_capacity: Some(40),
//!     anomaly_multiplier: Some(2.5),
//!     ..ConfigUpdate::default()
//! };
//! assert!(update.apply(&mut config));
//! assert_eq!(config.buffer_capacity, 40);
//! ```

use crate::constants::{
    BUFFER_BATCH_SIZE, DEFAULT_ACCEL_THRESHOLD_G, DEFAULT_ANOMALY_MULTIPLIER,
    DEFAULT_BUFFER_CAPACITY, DEFAULT_PUBLISH_INTERVAL_MS, DEFAULT_SENSOR_INTERVAL_MS,
    DEFAULT_SOUND_THRESHOLD, MAX_BUFFER_SIZE,
};
use crate::errors::{ConfigError, ConfigResult};

/// Thresholds and sizes the engine reads every tick
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Vibration spike threshold (g, gravity compensated)
    pub accel_threshold: f32,

    /// Sound spike threshold (raw peak amplitude)
    pub sound_threshold: f32,

    /// Sampling period for the acquisition scheduler (ms)
    #[cfg_attr(feature = "serde", serde(rename = "sensor_interval"))]
    pub sensor_interval_ms: u32,

    /// Live publish period for the network scheduler (ms)
    #[cfg_attr(feature = "serde", serde(rename = "publish_interval"))]
    pub publish_interval_ms: u32,

    /// Run the z-score checks at all
    pub anomaly_detection: bool,

    /// Z-score multiplier shared by every anomaly check
    #[cfg_attr(feature = "serde", serde(rename = "anomaly_threshold"))]
    pub anomaly_multiplier: f32,

    /// Effective offline buffer capacity, `1..=MAX_BUFFER_SIZE`
    #[cfg_attr(feature = "serde", serde(rename = "buffer_size"))]
    pub buffer_capacity: usize,

    /// Snapshots per message when draining the offline buffer
    pub batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accel_threshold: DEFAULT_ACCEL_THRESHOLD_G,
            sound_threshold: DEFAULT_SOUND_THRESHOLD,
            sensor_interval_ms: DEFAULT_SENSOR_INTERVAL_MS,
            publish_interval_ms: DEFAULT_PUBLISH_INTERVAL_MS,
            anomaly_detection: true,
            anomaly_multiplier: DEFAULT_ANOMALY_MULTIPLIER,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            batch_size: BUFFER_BATCH_SIZE,
        }
    }
}

impl Config {
    /// Checks every field the engine depends on
    pub fn validate(&self) -> ConfigResult<()> {
        if self.buffer_capacity == 0 || self.buffer_capacity > MAX_BUFFER_SIZE {
            return Err(ConfigError::CapacityOutOfRange {
                requested: self.buffer_capacity,
                max: MAX_BUFFER_SIZE,
            });
        }

        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }

        if !self.anomaly_multiplier.is_finite() || self.anomaly_multiplier <= 0.0 {
            return Err(ConfigError::InvalidMultiplier {
                value: self.anomaly_multiplier,
            });
        }

        if !self.accel_threshold.is_finite() {
            return Err(ConfigError::NonFiniteThreshold { name: "accel_threshold" });
        }

        if !self.sound_threshold.is_finite() {
            return Err(ConfigError::NonFiniteThreshold { name: "sound_threshold" });
        }

        Ok(())
    }

    /// Repairs a record loaded from storage
    ///
    /// An out-of-range capacity or zero batch size falls back to the firmware
    /// default, as does an unusable multiplier or threshold.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.buffer_capacity == 0 || self.buffer_capacity > MAX_BUFFER_SIZE {
            log_warn!(
                "buffer capacity {} out of range, using {}",
                self.buffer_capacity,
                defaults.buffer_capacity
            );
            self.buffer_capacity = defaults.buffer_capacity;
        }
        if self.batch_size == 0 {
            self.batch_size = defaults.batch_size;
        }
        if !self.anomaly_multiplier.is_finite() || self.anomaly_multiplier <= 0.0 {
            self.anomaly_multiplier = defaults.anomaly_multiplier;
        }
        if !self.accel_threshold.is_finite() {
            self.accel_threshold = defaults.accel_threshold;
        }
        if !self.sound_threshold.is_finite() {
            self.sound_threshold = defaults.sound_threshold;
        }

        self
    }
}

/// Partial update received from the remote configuration channel
///
/// Absent fields leave the current value untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConfigUpdate {
    /// See [`Config::accel_threshold`]
    pub accel_threshold: Option<f32>,
    /// See [`Config::sound_threshold`]
    pub sound_threshold: Option<f32>,
    /// See [`Config::sensor_interval_ms`]
    #[cfg_attr(feature = "serde", serde(rename = "sensor_interval"))]
    pub sensor_interval_ms: Option<u32>,
    /// See [`Config::publish_interval_ms`]
    #[cfg_attr(feature = "serde", serde(rename = "publish_interval"))]
    pub publish_interval_ms: Option<u32>,
    /// See [`Config::anomaly_detection`]
    pub anomaly_detection: Option<bool>,
    /// See [`Config::anomaly_multiplier`]
    #[cfg_attr(feature = "serde", serde(rename = "anomaly_threshold"))]
    pub anomaly_multiplier: Option<f32>,
    /// Skipped unless within `1..=MAX_BUFFER_SIZE`
    #[cfg_attr(feature = "serde", serde(rename = "buffer_size"))]
    pub buffer_capacity: Option<usize>,
    /// Skipped when zero
    pub batch_size: Option<usize>,
}

impl ConfigUpdate {
    /// Whether the update carries any field at all
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges every usable field into `config`
    ///
    /// Fields are checked one at a time: an out-of-range value is skipped
    /// and logged while the rest of the message still lands. Returns whether
    /// anything changed.
    pub fn apply(&self, config: &mut Config) -> bool {
        let before = *config;

        if let Some(v) = self.accel_threshold {
            if v.is_finite() {
                config.accel_threshold = v;
            } else {
                log_warn!("ignoring non-finite accel_threshold");
            }
        }
        if let Some(v) = self.sound_threshold {
            if v.is_finite() {
                config.sound_threshold = v;
            } else {
                log_warn!("ignoring non-finite sound_threshold");
            }
        }
        if let Some(v) = self.sensor_interval_ms {
            config.sensor_interval_ms = v;
        }
        if let Some(v) = self.publish_interval_ms {
            config.publish_interval_ms = v;
        }
        if let Some(v) = self.anomaly_detection {
            config.anomaly_detection = v;
        }
        if let Some(v) = self.anomaly_multiplier {
            if v.is_finite() && v > 0.0 {
                config.anomaly_multiplier = v;
            } else {
                log_warn!("ignoring anomaly multiplier {}", v);
            }
        }
        if let Some(v) = self.buffer_capacity {
            if v > 0 && v <= MAX_BUFFER_SIZE {
                config.buffer_capacity = v;
            } else {
                log_warn!("ignoring buffer size {}, limit is {}", v, MAX_BUFFER_SIZE);
            }
        }
        if let Some(v) = self.batch_size {
            if v > 0 {
                config.batch_size = v;
            } else {
                log_warn!("ignoring zero batch size");
            }
        }

        let changed = *config != before;
        if changed {
            log_info!("config updated, buffer capacity {}", config.buffer_capacity);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_firmware() {
        let config = Config::default();
        assert_eq!(config.accel_threshold, 1.2);
        assert_eq!(config.sound_threshold, 10_000.0);
        assert_eq!(config.sensor_interval_ms, 1000);
        assert_eq!(config.publish_interval_ms, 5000);
        assert!(config.anomaly_detection);
        assert_eq!(config.anomaly_multiplier, 3.0);
        assert_eq!(config.buffer_capacity, 20);
        assert_eq!(config.batch_size, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn capacity_bounds() {
        let mut config = Config::default();

        config.buffer_capacity = MAX_BUFFER_SIZE;
        assert!(config.validate().is_ok());

        config.buffer_capacity = MAX_BUFFER_SIZE + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CapacityOutOfRange { .. })
        ));

        config.buffer_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn multiplier_must_be_positive() {
        let mut config = Config::default();
        config.anomaly_multiplier = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMultiplier { .. })
        ));

        config.anomaly_multiplier = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn sanitized_repairs_loaded_record() {
        let mut config = Config::default();
        config.buffer_capacity = 500;
        config.batch_size = 0;
        config.sound_threshold = f32::INFINITY;

        let repaired = config.sanitized();
        assert_eq!(repaired.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
        assert_eq!(repaired.batch_size, BUFFER_BATCH_SIZE);
        assert_eq!(repaired.sound_threshold, DEFAULT_SOUND_THRESHOLD);
        assert!(repaired.validate().is_ok());
    }

    #[test]
    fn out_of_range_capacity_skipped_alone() {
        let mut config = Config::default();
        let update = ConfigUpdate {
            accel_threshold: Some(2.0),
            buffer_capacity: Some(0),
            ..ConfigUpdate::default()
        };

        assert!(update.apply(&mut config));
        assert_eq!(config.accel_threshold, 2.0);
        assert_eq!(config.buffer_capacity, DEFAULT_BUFFER_CAPACITY);

        let oversized = ConfigUpdate {
            buffer_capacity: Some(MAX_BUFFER_SIZE + 1),
            anomaly_multiplier: Some(-1.0),
            ..ConfigUpdate::default()
        };
        assert!(!oversized.apply(&mut config));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn update_reports_change() {
        let mut config = Config::default();

        let same = ConfigUpdate {
            buffer_capacity: Some(DEFAULT_BUFFER_CAPACITY),
            ..ConfigUpdate::default()
        };
        assert!(!same.apply(&mut config));

        let toggle = ConfigUpdate {
            anomaly_detection: Some(false),
            ..ConfigUpdate::default()
        };
        assert!(toggle.apply(&mut config));
        assert!(!config.anomaly_detection);
    }

    #[test]
    fn empty_update() {
        assert!(ConfigUpdate::default().is_empty());
        assert!(!ConfigUpdate { batch_size: Some(3), ..Default::default() }.is_empty());
    }
}
