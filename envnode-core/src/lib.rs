//! Offline buffering and statistical anomaly engine for envnode sensor nodes
//!
//! Buffers snapshots while the uplink is down and replays them in capture
//! order once it returns. Flags out-of-distribution readings with a per-channel
//! sliding-window z-score.
//!
//! Key constraints:
//! - `no_std` without the `std` feature
//! - No heap allocation: fixed arrays and `heapless` containers only
//! - One tick per sampling period, single-threaded
//!
//! ```rust
//! use envnode_core::{BufferCoordinator, Config, LinkState, Reading};
//! use envnode_core::errors::PublishResult;
//! use envnode_core::sink::{BatchSink, LiveRecord, LiveSink};
//!
//! struct Discard;
//! impl LiveSink for Discard {
//!     fn publish_live(&mut self, _: &LiveRecord<'_>) -> PublishResult { Ok(()) }
//! }
//! impl BatchSink for Discard {
//!     fn publish_batch(&mut self, _: &[Reading]) -> PublishResult { Ok(()) }
//! }
//!
//! let config = Config::default();
//! let mut coordinator: BufferCoordinator = BufferCoordinator::new(false, config.buffer_capacity);
//! coordinator.tick(&Reading::new(1), false, &config, &mut Discard);
//! assert_eq!(coordinator.state(), LinkState::Buffering);
//! assert_eq!(coordinator.buffer().len(), 1);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod alert;
pub mod anomaly;
pub mod battery;
pub mod buffer;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod errors;
pub mod gas;
pub mod heat;
pub mod node;
pub mod reading;
pub mod sink;
pub mod spikes;
pub mod stats;
pub mod time;

// Public API
pub use alert::{Alert, AnomalyAlert, DeviceId};
pub use anomaly::{AnomalyDetector, AnomalyRule};
pub use buffer::{DrainReport, OfflineRingBuffer, PushOutcome};
pub use config::{Config, ConfigUpdate};
pub use coordinator::{BufferCoordinator, LinkState, TickRoute};
pub use errors::{ConfigError, PublishError};
pub use node::{Command, CommandAck, FiniteOnly, SampleFilter, SensorNode, TickReport};
pub use reading::{Channel, Reading};
pub use sink::{AlertSink, BatchSink, LiveRecord, LiveSink};
pub use stats::SlidingWindowStats;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
