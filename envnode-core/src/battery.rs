//! Low-battery alert with hysteresis
//!
//! ```text
//!          pct < 20 (alert)
//!   Armed ─────────────────► Warned
//!     ▲                        │
//!     └────────────────────────┘
//!          pct > 30 (re-arm)
//! ```
//!
//! A non-finite percentage leaves the state untouched.

use crate::alert::{Alert, DeviceId};
use crate::constants::{BATTERY_RECOVERED_THRESHOLD_PCT, LOW_BATTERY_THRESHOLD_PCT};
use crate::reading::Reading;

/// One-shot low-battery alarm with hysteresis
#[derive(Debug, Clone)]
pub struct BatteryMonitor {
    device_id: DeviceId,
    warned: bool,
    low_threshold: f32,
    recovered_threshold: f32,
}

impl BatteryMonitor {
    /// Warns below 20 %, re-arms above 30 %
    pub fn new(device_id: DeviceId) -> Self {
        Self::with_thresholds(
            device_id,
            LOW_BATTERY_THRESHOLD_PCT,
            BATTERY_RECOVERED_THRESHOLD_PCT,
        )
    }

    /// `recovered` is raised to `low` if given below it
    pub fn with_thresholds(device_id: DeviceId, low: f32, recovered: f32) -> Self {
        Self {
            device_id,
            warned: false,
            low_threshold: low,
            recovered_threshold: if recovered < low { low } else { recovered },
        }
    }

    /// Whether an alert has fired and not yet been re-armed
    pub fn is_warned(&self) -> bool {
        self.warned
    }

    /// Alert on the first reading below the low threshold
    pub fn check(&mut self, reading: &Reading) -> Option<Alert> {
        let percentage = reading.battery_pct;
        if !percentage.is_finite() {
            return None;
        }

        if !self.warned && percentage < self.low_threshold {
            self.warned = true;
            log_warn!("battery low: {}%", percentage);
            return Some(Alert::LowBattery {
                device_id: self.device_id.clone(),
                timestamp: reading.timestamp,
                percentage,
            });
        }

        if self.warned && percentage > self.recovered_threshold {
            self.warned = false;
            log_info!("battery recovered: {}%", percentage);
        }

        None
    }

    /// Re-arms without waiting for recovery
    pub fn reset(&mut self) {
        self.warned = false;
    }
}
