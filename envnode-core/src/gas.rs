//! Gas concentration estimates from the sensor resistance ratio
//!
//! MQ-class sensors report `Rs/R0`; each target gas follows a power law
//! `ppm = (a / ratio)^b` read off the datasheet's log-log curve. The estimates
//! are coarse (±30 % at best) and are published as derived fields next to the
//! raw ratio, never fed back into the statistics.

use crate::constants::sensors::{
    CH4_CURVE_A, CH4_CURVE_B, CO_CURVE_A, CO_CURVE_B, LPG_CURVE_A, LPG_CURVE_B,
};

/// Carbon monoxide estimate (ppm)
pub fn co_ppm(ratio: f32) -> f32 {
    libm::powf(CO_CURVE_A / ratio, CO_CURVE_B)
}

/// Methane estimate (ppm)
pub fn ch4_ppm(ratio: f32) -> f32 {
    libm::powf(CH4_CURVE_A / ratio, CH4_CURVE_B)
}

/// Liquefied petroleum gas estimate (ppm)
pub fn lpg_ppm(ratio: f32) -> f32 {
    libm::powf(LPG_CURVE_A / ratio, LPG_CURVE_B)
}

/// All derived gas fields for one ratio
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GasEstimates {
    /// Carbon monoxide (ppm)
    pub co_ppm: f32,
    /// Methane (ppm)
    pub ch4_ppm: f32,
    /// LPG (ppm)
    pub lpg_ppm: f32,
}

impl GasEstimates {
    /// Evaluates every curve at `ratio`
    pub fn from_ratio(ratio: f32) -> Self {
        Self {
            co_ppm: co_ppm(ratio),
            ch4_ppm: ch4_ppm(ratio),
            lpg_ppm: lpg_ppm(ratio),
        }
    }
}
