//! Sensor Characteristics and Alert Thresholds
//!
//! Limits and calibration values for the node's sensor set: DHT-class
//! temperature/humidity, 3-axis IMU, MQ-class gas sensor, PDM microphone and
//! the LiPo battery divider.

// ===== ANOMALY DETECTION =====

/// Default z-score multiplier (3 sigma).
pub const DEFAULT_ANOMALY_MULTIPLIER: f32 = 3.0;

/// Temperature noise floor (°C).
///
/// A DHT-class sensor quantises to 0.1 °C, so a window with a smaller
/// standard deviation is effectively constant and z-scores against it are
/// meaningless.
pub const MIN_TEMP_STD_DEV: f32 = 0.1;

/// Gas ratio noise floor (dimensionless Rs/R0).
pub const MIN_GAS_STD_DEV: f32 = 0.01;

// ===== SPIKE THRESHOLDS =====

/// Default vibration spike threshold (g, gravity compensated).
pub const DEFAULT_ACCEL_THRESHOLD_G: f32 = 1.2;

/// Default sound spike threshold (raw PDM peak amplitude).
pub const DEFAULT_SOUND_THRESHOLD: f32 = 10_000.0;

/// Lower edge of the band treated as "at rest under gravity" (g).
pub const GRAVITY_BAND_MIN_G: f32 = 0.8;

/// Upper edge of the band treated as "at rest under gravity" (g).
pub const GRAVITY_BAND_MAX_G: f32 = 1.2;

/// Standard gravity subtracted inside the rest band (g).
pub const STANDARD_GRAVITY_G: f32 = 1.0;

// ===== GAS SENSOR CURVES =====
//
// MQ-class sensors follow ppm = (a / ratio)^b on a log-log datasheet plot.

/// CO curve coefficient.
pub const CO_CURVE_A: f32 = 4.07;
/// CO curve exponent.
pub const CO_CURVE_B: f32 = 4.0;
/// CH4 curve coefficient.
pub const CH4_CURVE_A: f32 = 7.08;
/// CH4 curve exponent.
pub const CH4_CURVE_B: f32 = 4.17;
/// LPG curve coefficient.
pub const LPG_CURVE_A: f32 = 10.96;
/// LPG curve exponent.
pub const LPG_CURVE_B: f32 = 2.78;

// ===== BATTERY =====

/// Battery percentage below which a low-battery alert is raised.
pub const LOW_BATTERY_THRESHOLD_PCT: f32 = 20.0;

/// Battery percentage above which the low-battery alert re-arms.
///
/// The 10 point gap keeps a sagging cell under load from flapping the alert.
pub const BATTERY_RECOVERED_THRESHOLD_PCT: f32 = 30.0;
