//! Buffer Sizes and Memory Constraints
//!
//! The offline store and the per-channel windows are plain arrays sized at
//! compile time. Their footprint on the node:
//!
//! ```text
//! OfflineRingBuffer<50>   50 × Option<Reading> (~40 B) ≈ 2 KB
//! ChannelHistories<10>    5 channels × 10 × f32        = 200 B
//! ```

// ===== OFFLINE STORE =====

/// Hard upper bound on offline ring buffer slots.
///
/// The effective capacity set through `Config` can never exceed this.
/// 50 snapshots covers a little over four minutes of outage at the
/// default 5 s publish cadence.
pub const MAX_BUFFER_SIZE: usize = 50;

/// Effective offline capacity used when no configuration says otherwise.
pub const DEFAULT_BUFFER_CAPACITY: usize = 20;

/// Readings per batch when replaying the offline store.
///
/// Five snapshots serialize to well under 1 KB of JSON, which keeps each
/// broker message inside the transport's packet buffer.
pub const BUFFER_BATCH_SIZE: usize = 5;

// ===== SLIDING WINDOWS =====

/// Samples retained per channel for mean / standard deviation.
///
/// At 1 Hz sampling this is a ten second baseline: short enough to follow
/// slow drift, long enough that a single spike stands out.
pub const HISTORY_SIZE: usize = 10;

/// Maximum length of the device identifier carried in alerts.
pub const MAX_DEVICE_ID_LENGTH: usize = 32;
