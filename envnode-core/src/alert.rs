//! Alert records emitted by the node
//!
//! ## Alert Families
//!
//! | kind               | raised by          | condition                               |
//! |--------------------|--------------------|-----------------------------------------|
//! | `anomaly_detected` | anomaly detector   | z-score above multiplier, spread above noise floor |
//! | `vibration_spike`  | spike detector     | gravity-compensated magnitude above threshold |
//! | `sound_spike`      | spike detector     | peak amplitude at or above threshold    |
//! | `low_battery`      | battery monitor    | charge drops below 20 %                 |
//!
//! Alerts are plain values. None of them is debounced by the core: a sustained
//! anomaly produces one alert per evaluation, and deduplication is left to the
//! alerting pipeline downstream.

use core::fmt;

use crate::constants::buffers::MAX_DEVICE_ID_LENGTH;
use crate::errors::{ConfigError, ConfigResult};
use crate::reading::Channel;
use crate::time::Timestamp;

/// Node identity carried in every alert
///
/// Stored inline so alerts never allocate.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DeviceId(heapless::String<MAX_DEVICE_ID_LENGTH>);

impl DeviceId {
    /// Fails when `id` exceeds the inline capacity
    pub fn new(id: &str) -> ConfigResult<Self> {
        let mut inner = heapless::String::new();
        inner.push_str(id).map_err(|_| ConfigError::DeviceIdTooLong {
            length: id.len(),
            max: MAX_DEVICE_ID_LENGTH,
        })?;
        Ok(Self(inner))
    }

    /// Identifier text
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistical outlier on one channel
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyAlert {
    /// Node that raised the alert
    pub device_id: DeviceId,
    /// Channel that fired
    pub channel: Channel,
    /// Capture time of the offending reading
    pub timestamp: Timestamp,
    /// Reading value in the channel's reporting unit
    pub value: f32,
    /// Window mean in the channel's reporting unit
    pub mean: f32,
    /// Window standard deviation in the stored unit
    pub std_dev: f32,
    /// `(value - mean) / std_dev` in the stored unit
    pub z_score: f32,
}

/// Any alert the node can raise
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Z-score rule fired
    Anomaly(AnomalyAlert),

    /// Shock or vibration above the configured threshold
    VibrationSpike {
        /// Node that raised the alert
        device_id: DeviceId,
        /// Capture time of the reading
        timestamp: Timestamp,
        /// Raw acceleration magnitude (g)
        magnitude: f32,
    },

    /// Loud sound at or above the configured threshold
    SoundSpike {
        /// Node that raised the alert
        device_id: DeviceId,
        /// Capture time of the reading
        timestamp: Timestamp,
        /// Peak amplitude
        level: f32,
    },

    /// Battery dropped below the warning threshold
    LowBattery {
        /// Node that raised the alert
        device_id: DeviceId,
        /// Capture time of the reading
        timestamp: Timestamp,
        /// Charge at the time of the alert (%)
        percentage: f32,
    },
}

impl Alert {
    /// Wire name of the alert family
    pub const fn kind(&self) -> &'static str {
        match self {
            Alert::Anomaly(_) => "anomaly_detected",
            Alert::VibrationSpike { .. } => "vibration_spike",
            Alert::SoundSpike { .. } => "sound_spike",
            Alert::LowBattery { .. } => "low_battery",
        }
    }

    /// Node the alert came from
    pub fn device_id(&self) -> &DeviceId {
        match self {
            Alert::Anomaly(alert) => &alert.device_id,
            Alert::VibrationSpike { device_id, .. }
            | Alert::SoundSpike { device_id, .. }
            | Alert::LowBattery { device_id, .. } => device_id,
        }
    }

    /// Capture time of the triggering reading
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Alert::Anomaly(alert) => alert.timestamp,
            Alert::VibrationSpike { timestamp, .. }
            | Alert::SoundSpike { timestamp, .. }
            | Alert::LowBattery { timestamp, .. } => *timestamp,
        }
    }
}
