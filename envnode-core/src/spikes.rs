//! Threshold alerts for shock and loud sound
//!
//! Vibration is judged on the acceleration magnitude. A board at rest reads
//! roughly 1 g from gravity alone, so magnitudes inside the gravity band
//! `(0.8, 1.2)` have 1 g subtracted before the comparison:
//!
//! ```text
//!   magnitude ──► in (0.8, 1.2)? ──yes──► m - 1.0 ──┐
//!                       │                           ├──► m > accel_threshold ?
//!                       └──no───────────────► m ────┘
//! ```
//!
//! Sound fires when the peak level is at or above the threshold.

use crate::alert::{Alert, DeviceId};
use crate::config::Config;
use crate::constants::sensors::{GRAVITY_BAND_MAX_G, GRAVITY_BAND_MIN_G, STANDARD_GRAVITY_G};
use crate::reading::Reading;

/// Magnitude with gravity removed when the board looks stationary
pub fn gravity_compensated(magnitude: f32) -> f32 {
    if magnitude > GRAVITY_BAND_MIN_G && magnitude < GRAVITY_BAND_MAX_G {
        magnitude - STANDARD_GRAVITY_G
    } else {
        magnitude
    }
}

/// Alerts raised by one spike check, vibration first
pub type SpikeAlerts = heapless::Vec<Alert, 2>;

/// Stateless threshold checks on acceleration and sound
#[derive(Debug, Clone)]
pub struct SpikeDetector {
    device_id: DeviceId,
}

impl SpikeDetector {
    /// Detector stamping alerts with `device_id`
    pub fn new(device_id: DeviceId) -> Self {
        Self { device_id }
    }

    /// Fires when the gravity-compensated magnitude exceeds `threshold`
    pub fn vibration(&self, reading: &Reading, threshold: f32) -> Option<Alert> {
        let magnitude = reading.accel_magnitude;
        if !magnitude.is_finite() {
            return None;
        }

        if gravity_compensated(magnitude) > threshold {
            log_info!("vibration spike, magnitude {}", magnitude);
            Some(Alert::VibrationSpike {
                device_id: self.device_id.clone(),
                timestamp: reading.timestamp,
                magnitude,
            })
        } else {
            None
        }
    }

    /// Fires when the peak reaches `threshold`
    pub fn sound(&self, reading: &Reading, threshold: f32) -> Option<Alert> {
        let level = reading.sound_level;
        if level.is_finite() && level >= threshold {
            log_info!("sound spike, level {}", level);
            Some(Alert::SoundSpike {
                device_id: self.device_id.clone(),
                timestamp: reading.timestamp,
                level,
            })
        } else {
            None
        }
    }

    /// Both checks against the thresholds in `config`
    pub fn check(&self, reading: &Reading, config: &Config) -> SpikeAlerts {
        let mut alerts = SpikeAlerts::new();
        if let Some(alert) = self.vibration(reading, config.accel_threshold) {
            let _ = alerts.push(alert);
        }
        if let Some(alert) = self.sound(reading, config.sound_threshold) {
            let _ = alerts.push(alert);
        }
        alerts
    }
}
