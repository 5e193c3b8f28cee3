//! Sensor snapshots and monitored channels
//!
//! A [`Reading`] is the complete state of the node at one sampling tick. It is
//! `Copy` and small (~32 bytes) so it can move between the stack, a ring
//! buffer slot and a sink call without ever being shared.
//!
//! [`Channel`] names the numeric series the statistics engine tracks. The
//! battery percentage is carried in the snapshot but is not a monitored
//! channel: it is watched by the battery monitor instead.

use crate::time::Timestamp;

/// One snapshot of every sensor on the node
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// Monotonic capture time in milliseconds
    pub timestamp: Timestamp,
    /// Air temperature (°C)
    pub temperature: f32,
    /// Relative humidity (%RH)
    pub humidity: f32,
    /// Acceleration vector magnitude (g)
    pub accel_magnitude: f32,
    /// Gas sensor resistance ratio Rs/R0
    pub gas_ratio: f32,
    /// Peak microphone amplitude since the previous tick
    pub sound_level: f32,
    /// Battery state of charge (0-100 %)
    pub battery_pct: f32,
    /// Running from the battery rather than external power
    pub on_battery: bool,
    /// Acquisition flagged the snapshot as usable
    pub valid: bool,
}

impl Reading {
    /// Creates a valid snapshot with every measurement at zero
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            valid: true,
            ..Self::default()
        }
    }

    /// Sets the air temperature (°C)
    pub fn with_temperature(mut self, celsius: f32) -> Self {
        self.temperature = celsius;
        self
    }

    /// Sets the relative humidity (%RH)
    pub fn with_humidity(mut self, percent: f32) -> Self {
        self.humidity = percent;
        self
    }

    /// Sets the acceleration magnitude (g)
    pub fn with_accel_magnitude(mut self, g: f32) -> Self {
        self.accel_magnitude = g;
        self
    }

    /// Sets the gas resistance ratio
    pub fn with_gas_ratio(mut self, ratio: f32) -> Self {
        self.gas_ratio = ratio;
        self
    }

    /// Sets the sound peak amplitude
    pub fn with_sound_level(mut self, level: f32) -> Self {
        self.sound_level = level;
        self
    }

    /// Sets the battery percentage
    pub fn with_battery(mut self, percent: f32) -> Self {
        self.battery_pct = percent;
        self
    }

    /// Sets the power source flag
    pub fn with_on_battery(mut self, on_battery: bool) -> Self {
        self.on_battery = on_battery;
        self
    }

    /// Marks the snapshot as unusable (sensor fault upstream)
    pub fn invalidated(mut self) -> Self {
        self.valid = false;
        self
    }

    /// Value of a single monitored channel
    pub fn value(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Temperature => self.temperature,
            Channel::Humidity => self.humidity,
            Channel::Acceleration => self.accel_magnitude,
            Channel::Gas => self.gas_ratio,
            Channel::Sound => self.sound_level,
        }
    }
}

/// Magnitude of a raw 3-axis acceleration vector
pub fn accel_magnitude(ax: f32, ay: f32, az: f32) -> f32 {
    libm::sqrtf(ax * ax + ay * ay + az * az)
}

/// Numeric series tracked by the statistics engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum Channel {
    /// Air temperature
    Temperature = 0,
    /// Relative humidity
    Humidity = 1,
    /// Acceleration magnitude
    Acceleration = 2,
    /// Gas resistance ratio
    Gas = 3,
    /// Microphone peak
    Sound = 4,
}

impl Channel {
    /// Number of monitored channels
    pub const COUNT: usize = 5;

    /// All channels in storage order
    pub const ALL: [Channel; Channel::COUNT] = [
        Channel::Temperature,
        Channel::Humidity,
        Channel::Acceleration,
        Channel::Gas,
        Channel::Sound,
    ];

    /// Name used on the wire
    pub const fn name(&self) -> &'static str {
        match self {
            Channel::Temperature => "temperature",
            Channel::Humidity => "humidity",
            Channel::Acceleration => "acceleration",
            Channel::Gas => "gas",
            Channel::Sound => "sound",
        }
    }

    /// Unit of the stored samples
    pub const fn unit(&self) -> &'static str {
        match self {
            Channel::Temperature => "°C",
            Channel::Humidity => "%",
            Channel::Acceleration => "g",
            Channel::Gas => "Rs/R0",
            Channel::Sound => "",
        }
    }

    /// Position in per-channel arrays
    pub const fn index(&self) -> usize {
        *self as usize
    }
}
