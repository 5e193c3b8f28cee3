//! Z-Score Anomaly Detection with Noise Floor
//!
//! ## Rule
//!
//! For a channel value `v` and its window's `mean` and `std_dev`:
//!
//! ```text
//! fire  ⇔  |v − mean| > multiplier × std_dev   AND   std_dev > noise_floor
//! ```
//!
//! Both comparisons are strict. The noise floor matters on slowly changing
//! signals: a temperature window that reads 20.0 ten times in a row has zero
//! spread, and without the floor any deviation at all would be "infinitely"
//! anomalous.
//!
//! ## Statelessness
//!
//! Each evaluation stands alone. A sustained excursion fires on every tick for
//! as long as the rule holds; there is no suppression window.
//!
//! ## Units
//!
//! The z-score is always computed in the unit the window stores. A check may
//! convert the reported `value` and `mean` into a friendlier unit (the gas
//! channel stores Rs/R0 but reports CO ppm).

use crate::alert::{AnomalyAlert, DeviceId};
use crate::constants::sensors::{MIN_GAS_STD_DEV, MIN_TEMP_STD_DEV};
use crate::gas;
use crate::reading::{Channel, Reading};
use crate::stats::{ChannelHistories, WindowSummary};

/// The bare z-score test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyRule {
    /// Deviations beyond `multiplier × std_dev` fire
    pub multiplier: f32,
    /// Windows with a smaller spread are treated as constant
    pub noise_floor: f32,
}

impl AnomalyRule {
    /// Rule for one channel
    pub const fn new(multiplier: f32, noise_floor: f32) -> Self {
        Self { multiplier, noise_floor }
    }

    /// Z-score of `value` if the rule fires
    ///
    /// Any NaN input makes both comparisons false, so a poisoned window never
    /// fires.
    pub fn evaluate(&self, value: f32, mean: f32, std_dev: f32) -> Option<f32> {
        let deviation = value - mean;
        if std_dev > self.noise_floor && libm::fabsf(deviation) > self.multiplier * std_dev {
            Some(deviation / std_dev)
        } else {
            None
        }
    }
}

/// Unit the alert reports a channel in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reporting {
    /// Same unit as stored
    Native,
    /// Gas ratio converted to CO ppm
    CarbonMonoxidePpm,
}

impl Reporting {
    /// Converts a stored value to the reporting unit
    pub fn convert(&self, stored: f32) -> f32 {
        match self {
            Reporting::Native => stored,
            Reporting::CarbonMonoxidePpm => gas::co_ppm(stored),
        }
    }
}

/// One monitored channel with its own noise floor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelCheck {
    /// Monitored channel
    pub channel: Channel,
    /// Minimum spread before the rule is trusted
    pub noise_floor: f32,
    /// Unit used in the alert
    pub reporting: Reporting,
}

impl ChannelCheck {
    /// Temperature with the 0.1 °C floor
    pub const fn temperature() -> Self {
        Self {
            channel: Channel::Temperature,
            noise_floor: MIN_TEMP_STD_DEV,
            reporting: Reporting::Native,
        }
    }

    /// Gas ratio with the 0.01 floor, reported as CO ppm
    pub const fn gas() -> Self {
        Self {
            channel: Channel::Gas,
            noise_floor: MIN_GAS_STD_DEV,
            reporting: Reporting::CarbonMonoxidePpm,
        }
    }
}

/// Alerts from one evaluation; at most one per channel
pub type AnomalyAlerts = heapless::Vec<AnomalyAlert, { Channel::COUNT }>;

/// Runs every configured channel check against the current windows
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    device_id: DeviceId,
    checks: heapless::Vec<ChannelCheck, { Channel::COUNT }>,
}

impl AnomalyDetector {
    /// Temperature and gas checks, as deployed
    pub fn new(device_id: DeviceId) -> Self {
        let mut checks = heapless::Vec::new();
        let _ = checks.push(ChannelCheck::temperature());
        let _ = checks.push(ChannelCheck::gas());
        Self { device_id, checks }
    }

    /// Detector with a custom check list
    ///
    /// A channel listed twice keeps its first entry.
    pub fn with_checks(device_id: DeviceId, checks: &[ChannelCheck]) -> Self {
        let mut list: heapless::Vec<ChannelCheck, { Channel::COUNT }> = heapless::Vec::new();
        for check in checks {
            if list.iter().any(|c| c.channel == check.channel) {
                continue;
            }
            let _ = list.push(*check);
        }
        Self { device_id, checks: list }
    }

    /// Checks in evaluation order
    pub fn checks(&self) -> &[ChannelCheck] {
        &self.checks
    }

    /// Identity stamped on every alert
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Evaluates each check, sharing `multiplier`
    pub fn evaluate<const N: usize>(
        &self,
        reading: &Reading,
        histories: &ChannelHistories<N>,
        multiplier: f32,
    ) -> AnomalyAlerts {
        let mut alerts = AnomalyAlerts::new();

        for check in &self.checks {
            let window = histories.get(check.channel);
            let value = reading.value(check.channel);
            let WindowSummary { mean, std_dev, .. } = window.summary();

            let rule = AnomalyRule::new(multiplier, check.noise_floor);
            if let Some(z_score) = rule.evaluate(value, mean, std_dev) {
                log_warn!("{} anomaly detected, z = {}", check.channel.name(), z_score);

                let _ = alerts.push(AnomalyAlert {
                    device_id: self.device_id.clone(),
                    channel: check.channel,
                    timestamp: reading.timestamp,
                    value: check.reporting.convert(value),
                    mean: check.reporting.convert(mean),
                    std_dev,
                    z_score,
                });
            }
        }

        alerts
    }
}
