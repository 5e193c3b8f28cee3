//! Error Types for Configuration and Publishing
//!
//! ## Design Philosophy
//!
//! The engine itself never fails: buffer overflow is resolved by
//! overwrite-oldest and zero variance by the noise floor. Errors only appear at
//! the two seams where the core meets its collaborators:
//!
//! 1. **Configuration**: a remote update or a freshly loaded record may carry
//!    values the engine cannot run with (a zero capacity would make the ring
//!    index arithmetic divide by zero).
//! 2. **Publishing**: a sink may refuse a message. The core logs and counts
//!    the failure; retry belongs to the network collaborator.
//!
//! Like the rest of the crate the errors are small `Copy` values holding only
//! `&'static str` context, so they can be returned from the tick path without
//! allocation.
//!
//! ```rust
//! use envnode_core::{Config, ConfigError};
//!
//! let mut config = Config::default();
//! config.buffer_capacity = 0;
//! assert!(matches!(
//!     config.validate(),
//!     Err(ConfigError::CapacityOutOfRange { requested: 0, .. })
//! ));
//! ```

use thiserror_no_std::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for sink operations
pub type PublishResult = Result<(), PublishError>;

/// Configuration values the engine refuses to run with
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Effective buffer capacity outside `[1, max]`
    #[error("Buffer capacity {requested} outside [1, {max}]")]
    CapacityOutOfRange {
        /// Capacity that was asked for
        requested: usize,
        /// Compile-time slot count of the ring buffer
        max: usize,
    },

    /// Drain batch size of zero would never make progress
    #[error("Batch size must be at least 1")]
    ZeroBatchSize,

    /// Anomaly multiplier must be a positive finite number
    #[error("Anomaly multiplier {value} must be positive and finite")]
    InvalidMultiplier {
        /// The rejected multiplier
        value: f32,
    },

    /// Threshold is NaN or infinite
    #[error("Threshold {name} is not a finite number")]
    NonFiniteThreshold {
        /// Which threshold was rejected
        name: &'static str,
    },

    /// Device identifier does not fit the inline buffer
    #[error("Device id of {length} bytes exceeds {max}")]
    DeviceIdTooLong {
        /// Length of the rejected identifier
        length: usize,
        /// Maximum accepted length
        max: usize,
    },
}

/// Reasons a sink could not take a message
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishError {
    /// Transport has no session
    #[error("Not connected")]
    NotConnected,

    /// Transport refused the message
    #[error("Publish rejected: {reason}")]
    Rejected {
        /// Short transport-specific cause
        reason: &'static str,
    },

    /// Payload could not be encoded
    #[error("Payload encoding failed")]
    Encoding,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::CapacityOutOfRange { requested, max } =>
                defmt::write!(fmt, "Capacity {} outside [1, {}]", requested, max),
            Self::ZeroBatchSize =>
                defmt::write!(fmt, "Batch size is zero"),
            Self::InvalidMultiplier { value } =>
                defmt::write!(fmt, "Invalid multiplier {}", value),
            Self::NonFiniteThreshold { name } =>
                defmt::write!(fmt, "Threshold {} not finite", name),
            Self::DeviceIdTooLong { length, max } =>
                defmt::write!(fmt, "Device id {} > {}", length, max),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PublishError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NotConnected => defmt::write!(fmt, "Not connected"),
            Self::Rejected { reason } => defmt::write!(fmt, "Rejected: {}", reason),
            Self::Encoding => defmt::write!(fmt, "Encoding failed"),
        }
    }
}
