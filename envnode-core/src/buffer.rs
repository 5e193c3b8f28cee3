//! Offline Ring Buffer for Store-and-Forward Publishing
//!
//! ## Overview
//!
//! While the broker is unreachable the node keeps complete snapshots in a
//! fixed array and replays them, oldest first, once the link returns. Memory is
//! bounded at compile time by `MAX`; the *effective* capacity is a runtime
//! setting from `Config` that never exceeds it.
//!
//! ## Overwrite Policy
//!
//! When the buffer is full the next push discards the oldest unread snapshot.
//! Recent data is worth more than old data for an environmental node, and a
//! buffer that refused new readings would silently freeze the picture at the
//! moment the link dropped.
//!
//! ```text
//! capacity = 5, after pushing r1..r7:
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │ r6  │ r7  │ r3  │ r4  │ r5  │    count = 5 (saturated)
//! └─────┴─────┴─────┴─────┴─────┘
//!              ↑
//!        read_index = write_index = 2
//! ```
//!
//! ## Draining
//!
//! Entries only leave through [`OfflineRingBuffer::drain_batch`], which hands
//! consecutive runs of up to `batch_size` snapshots to a [`BatchSink`] until
//! the buffer is empty. There is no random access.
//!
//! ```rust
//! use envnode_core::buffer::OfflineRingBuffer;
//! use envnode_core::reading::Reading;
//! use envnode_core::sink::BatchSink;
//! use envnode_core::errors::PublishResult;
//!
//! struct Collect(Vec<Vec<u64>>);
//!
//! impl BatchSink for Collect {
//!     fn publish_batch(&mut self, batch: &[Reading]) -> PublishResult {
//!         self.0.push(batch.iter().map(|r| r.timestamp).collect());
//!         Ok(())
//!     }
//! }
//!
//! let mut buffer: OfflineRingBuffer<50> = OfflineRingBuffer::with_capacity(5);
//! for t in 1..=10 {
//!     buffer.push(Reading::new(t));
//! }
//!
//! let mut sink = Collect(Vec::new());
//! buffer.drain_batch(2, &mut sink);
//! assert_eq!(sink.0, vec![vec![6, 7], vec![8, 9], vec![10]]);
//! ```

use crate::reading::Reading;
use crate::sink::BatchSink;

/// What a push did to the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Stored in a free slot
    Stored,
    /// Buffer was full; the oldest unread snapshot was discarded
    OverwroteOldest,
}

/// Lifetime counters
///
/// Saturating, so a node that runs for years reports a ceiling instead of
/// wrapping to a misleading small number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    /// Snapshots pushed
    pub pushed: u32,
    /// Snapshots discarded unread (overwrite or capacity shrink)
    pub overwritten: u32,
    /// Snapshots handed to a sink by a drain
    pub drained: u32,
}

/// Result of one full drain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Sink invocations made
    pub batches: usize,
    /// Snapshots handed to the sink
    pub readings: usize,
    /// Sink invocations that returned an error
    pub failed_batches: usize,
}

/// Fixed-capacity FIFO of snapshots with overwrite-oldest
///
/// ## Type Parameter
///
/// - `MAX`: physical slot count. Must be at least 1.
///
/// ## Internal Invariants
///
/// - `1 <= capacity <= MAX`
/// - `0 <= count <= capacity`
/// - `read_index < capacity`, `write_index < capacity`
/// - exactly `count` slots are `Some`, starting at `read_index` and wrapping
///   modulo `capacity`
#[derive(Debug, Clone)]
pub struct OfflineRingBuffer<const MAX: usize> {
    /// `None` marks an invalid (free or consumed) slot
    slots: [Option<Reading>; MAX],

    /// Effective capacity from configuration
    capacity: usize,

    /// Slot the next push writes to
    write_index: usize,

    /// Oldest unread snapshot
    read_index: usize,

    /// Unread snapshots
    count: usize,

    stats: BufferStats,
}

impl<const MAX: usize> OfflineRingBuffer<MAX> {
    /// Creates an empty buffer using every physical slot
    pub const fn new() -> Self {
        Self::with_capacity(MAX)
    }

    /// Creates an empty buffer with an effective capacity
    ///
    /// `capacity` is clamped into `[1, MAX]`.
    pub const fn with_capacity(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            1
        } else if capacity > MAX {
            MAX
        } else {
            capacity
        };

        Self {
            slots: [None; MAX],
            capacity,
            write_index: 0,
            read_index: 0,
            count: 0,
            stats: BufferStats {
                pushed: 0,
                overwritten: 0,
                drained: 0,
            },
        }
    }

    /// Appends a snapshot, discarding the oldest unread one when full
    pub fn push(&mut self, reading: Reading) -> PushOutcome {
        let outcome = if self.count < self.capacity {
            self.count += 1;
            PushOutcome::Stored
        } else {
            // Full: write_index == read_index, so step the reader past the
            // slot we are about to overwrite.
            self.read_index = (self.read_index + 1) % self.capacity;
            self.stats.overwritten = self.stats.overwritten.saturating_add(1);
            PushOutcome::OverwroteOldest
        };

        self.slots[self.write_index] = Some(reading);
        self.write_index = (self.write_index + 1) % self.capacity;
        self.stats.pushed = self.stats.pushed.saturating_add(1);

        log_debug!("offline buffer push, count {}", self.count);
        outcome
    }

    /// Hands every unread snapshot to `sink`, `batch_size` at a time
    ///
    /// Oldest first. Each consumed slot is invalidated and the read index
    /// advanced whether or not the sink accepted the batch: a failed batch is
    /// counted in the report and logged, never retried. `batch_size` is
    /// clamped into `[1, MAX]`.
    pub fn drain_batch<S>(&mut self, batch_size: usize, sink: &mut S) -> DrainReport
    where
        S: BatchSink + ?Sized,
    {
        let batch_size = batch_size.max(1).min(MAX);
        let mut report = DrainReport::default();

        if self.count > 0 {
            log_info!("draining {} buffered readings", self.count);
        }

        while self.count > 0 {
            let mut batch: heapless::Vec<Reading, MAX> = heapless::Vec::new();
            let mut taken = 0;

            while taken < batch_size && self.count > 0 {
                if let Some(reading) = self.slots[self.read_index].take() {
                    // Cannot overflow: taken <= batch_size <= MAX
                    let _ = batch.push(reading);
                }
                self.read_index = (self.read_index + 1) % self.capacity;
                self.count -= 1;
                taken += 1;
            }

            if batch.is_empty() {
                continue;
            }

            report.batches += 1;
            report.readings += batch.len();

            if let Err(_err) = sink.publish_batch(&batch) {
                report.failed_batches += 1;
                log_warn!("buffered batch of {} readings not published", batch.len());
            }
        }

        self.stats.drained = self
            .stats
            .drained
            .saturating_add(report.readings as u32);

        if report.readings > 0 {
            log_info!(
                "sent {} buffered readings in {} batches",
                report.readings,
                report.batches
            );
        }

        report
    }

    /// Invalidates every slot and zeroes the indices
    pub fn reset(&mut self) {
        self.slots = [None; MAX];
        self.write_index = 0;
        self.read_index = 0;
        self.count = 0;
        log_info!("offline buffer cleared");
    }

    /// Applies a new effective capacity
    ///
    /// Clamped into `[1, MAX]`. When it differs from the current one the unread
    /// snapshots are laid out again oldest-first from slot 0, keeping only the
    /// newest `min(len, capacity)`.
    pub fn set_capacity(&mut self, capacity: usize) {
        let capacity = capacity.max(1).min(MAX);
        if capacity == self.capacity {
            return;
        }

        let keep = self.count.min(capacity);
        let skip = self.count - keep;

        let mut relaid: [Option<Reading>; MAX] = [None; MAX];
        for (i, slot) in relaid.iter_mut().take(keep).enumerate() {
            *slot = self.slots[(self.read_index + skip + i) % self.capacity];
        }

        self.slots = relaid;
        self.capacity = capacity;
        self.read_index = 0;
        self.count = keep;
        self.write_index = keep % capacity;
        self.stats.overwritten = self.stats.overwritten.saturating_add(skip as u32);

        log_info!("offline buffer capacity now {}, kept {}", capacity, keep);
    }

    /// Unread snapshots
    pub fn len(&self) -> usize {
        self.count
    }

    /// Nothing waiting to drain
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Next push overwrites the oldest snapshot
    pub fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    /// Effective capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slot the next push writes
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Slot holding the oldest snapshot
    pub fn read_index(&self) -> usize {
        self.read_index
    }

    /// Lifetime counters
    pub fn stats(&self) -> BufferStats {
        self.stats
    }
}

impl<const MAX: usize> Default for OfflineRingBuffer<MAX> {
    fn default() -> Self {
        Self::new()
    }
}
