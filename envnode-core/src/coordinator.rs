//! Live / Buffering State Machine
//!
//! ## Overview
//!
//! The coordinator decides, once per tick, where the current snapshot goes:
//! straight to the live sink while the link is up, or into the offline ring
//! while it is down. When the link comes back the whole backlog is drained,
//! oldest first, before the snapshot that triggered the transition is
//! published live.
//!
//! ```text
//!                 connected = false
//!        ┌──────┐ ─────────────────► ┌───────────┐
//!        │ Live │                    │ Buffering │ ◄─┐ push(reading)
//!        └──────┘ ◄───────────────── └───────────┘ ──┘
//!          │  ▲     connected = true
//!          │  │     drain_batch(batch_size) then publish_live
//!          └──┘
//!      publish_live(reading)
//! ```
//!
//! ## Configuration
//!
//! The effective capacity and batch size are re-read from [`Config`] every
//! tick. A capacity change is applied before the snapshot is routed.
//!
//! ## Failures
//!
//! Sink errors are logged and reported in the [`TickRoute`]; nothing is
//! retried and a failed live snapshot is not buffered.

use crate::buffer::{DrainReport, OfflineRingBuffer, PushOutcome};
use crate::config::Config;
use crate::constants::MAX_BUFFER_SIZE;
use crate::errors::PublishError;
use crate::reading::Reading;
use crate::sink::{BatchSink, LiveRecord, LiveSink};

/// Link-facing state of the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinkState {
    /// Snapshots go straight to the live sink
    Live,
    /// Snapshots accumulate in the offline ring
    Buffering,
}

impl LinkState {
    /// State for a given link status
    pub const fn from_connected(connected: bool) -> Self {
        if connected {
            LinkState::Live
        } else {
            LinkState::Buffering
        }
    }
}

/// Where one tick's snapshot ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickRoute {
    /// Live sink accepted it
    Published,
    /// Live sink refused it; it is not buffered
    PublishFailed(PublishError),
    /// Stored in the offline ring
    Buffered(PushOutcome),
}

/// Everything the coordinator did during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorOutcome {
    /// Where the snapshot went
    pub route: TickRoute,
    /// Set when this tick changed the link state
    pub transition: Option<LinkState>,
    /// Set when this tick drained the backlog
    pub drain: Option<DrainReport>,
}

/// Owns the offline ring and routes snapshots by link state
#[derive(Debug, Clone)]
pub struct BufferCoordinator<const MAX: usize = MAX_BUFFER_SIZE> {
    state: LinkState,
    buffer: OfflineRingBuffer<MAX>,
}

impl<const MAX: usize> BufferCoordinator<MAX> {
    /// Starts in the state matching the link at boot
    pub fn new(connected: bool, capacity: usize) -> Self {
        Self {
            state: LinkState::from_connected(connected),
            buffer: OfflineRingBuffer::with_capacity(capacity),
        }
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// The offline backlog
    pub fn buffer(&self) -> &OfflineRingBuffer<MAX> {
        &self.buffer
    }

    /// Drops the backlog without publishing it
    pub fn clear(&mut self) {
        self.buffer.reset();
    }

    /// Routes one snapshot
    pub fn tick<P>(
        &mut self,
        reading: &Reading,
        connected: bool,
        config: &Config,
        sink: &mut P,
    ) -> CoordinatorOutcome
    where
        P: LiveSink + BatchSink + ?Sized,
    {
        self.buffer.set_capacity(config.buffer_capacity);

        let next = LinkState::from_connected(connected);
        let transition = if next != self.state {
            match next {
                LinkState::Live => log_info!("link up, leaving offline mode"),
                LinkState::Buffering => log_warn!("link down, buffering readings"),
            }
            self.state = next;
            Some(next)
        } else {
            None
        };

        let drain = if transition == Some(LinkState::Live) {
            Some(self.buffer.drain_batch(config.batch_size, sink))
        } else {
            None
        };

        let route = match self.state {
            LinkState::Buffering => TickRoute::Buffered(self.buffer.push(*reading)),
            LinkState::Live => match sink.publish_live(&LiveRecord::new(reading)) {
                Ok(()) => TickRoute::Published,
                Err(err) => {
                    log_warn!("live publish failed");
                    TickRoute::PublishFailed(err)
                }
            },
        };

        CoordinatorOutcome {
            route,
            transition,
            drain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PublishResult;

    #[derive(Default)]
    struct Recorder {
        live: Vec<u64>,
        batches: Vec<Vec<u64>>,
        events: Vec<&'static str>,
        fail_live: bool,
    }

    impl LiveSink for Recorder {
        fn publish_live(&mut self, record: &LiveRecord<'_>) -> PublishResult {
            self.events.push("live");
            if self.fail_live {
                return Err(PublishError::NotConnected);
            }
            self.live.push(record.reading.timestamp);
            Ok(())
        }
    }

    impl BatchSink for Recorder {
        fn publish_batch(&mut self, batch: &[Reading]) -> PublishResult {
            self.events.push("batch");
            self.batches.push(batch.iter().map(|r| r.timestamp).collect());
            Ok(())
        }
    }

    fn reading(ts: u64) -> Reading {
        Reading::new(ts).with_temperature(21.0)
    }

    #[test]
    fn initial_state_follows_link() {
        assert_eq!(BufferCoordinator::<8>::new(true, 8).state(), LinkState::Live);
        assert_eq!(
            BufferCoordinator::<8>::new(false, 8).state(),
            LinkState::Buffering
        );
    }

    #[test]
    fn live_ticks_leave_buffer_alone() {
        let mut coordinator = BufferCoordinator::<8>::new(true, 8);
        let mut sink = Recorder::default();
        let config = Config::default();

        for ts in 1..=3 {
            let outcome = coordinator.tick(&reading(ts), true, &config, &mut sink);
            assert_eq!(outcome.route, TickRoute::Published);
            assert_eq!(outcome.transition, None);
        }

        assert_eq!(sink.live, vec![1, 2, 3]);
        assert!(coordinator.buffer().is_empty());
        assert_eq!(coordinator.buffer().stats().pushed, 0);
    }

    #[test]
    fn reconnect_drains_before_live() {
        let mut coordinator = BufferCoordinator::<8>::new(true, 8);
        let mut sink = Recorder::default();
        let config = Config {
            batch_size: 2,
            ..Config::default()
        };

        coordinator.tick(&reading(1), true, &config, &mut sink);
        let down = coordinator.tick(&reading(2), false, &config, &mut sink);
        assert_eq!(down.transition, Some(LinkState::Buffering));
        coordinator.tick(&reading(3), false, &config, &mut sink);
        coordinator.tick(&reading(4), false, &config, &mut sink);
        assert_eq!(coordinator.buffer().len(), 3);

        let up = coordinator.tick(&reading(5), true, &config, &mut sink);
        assert_eq!(up.transition, Some(LinkState::Live));
        assert_eq!(up.route, TickRoute::Published);
        let drain = up.drain.unwrap();
        assert_eq!(drain.readings, 3);
        assert_eq!(drain.batches, 2);

        assert_eq!(sink.batches, vec![vec![2, 3], vec![4]]);
        assert_eq!(sink.live, vec![1, 5]);
        assert_eq!(sink.events, vec!["live", "batch", "batch", "live"]);
        assert!(coordinator.buffer().is_empty());
    }

    #[test]
    fn capacity_follows_config() {
        let mut coordinator = BufferCoordinator::<8>::new(false, 8);
        let mut sink = Recorder::default();
        let mut config = Config {
            buffer_capacity: 8,
            ..Config::default()
        };

        for ts in 1..=6 {
            coordinator.tick(&reading(ts), false, &config, &mut sink);
        }

        config.buffer_capacity = 4;
        coordinator.tick(&reading(7), false, &config, &mut sink);
        assert_eq!(coordinator.buffer().capacity(), 4);
        assert_eq!(coordinator.buffer().len(), 4);

        coordinator.tick(&reading(8), true, &config, &mut sink);
        assert_eq!(sink.batches.concat(), vec![4, 5, 6, 7]);
    }

    #[test]
    fn failed_live_publish_is_not_buffered() {
        let mut coordinator = BufferCoordinator::<8>::new(true, 8);
        let mut sink = Recorder {
            fail_live: true,
            ..Recorder::default()
        };

        let outcome = coordinator.tick(&reading(1), true, &Config::default(), &mut sink);
        assert_eq!(
            outcome.route,
            TickRoute::PublishFailed(PublishError::NotConnected)
        );
        assert!(coordinator.buffer().is_empty());
    }

    #[test]
    fn clear_drops_backlog() {
        let mut coordinator = BufferCoordinator::<8>::new(false, 8);
        let mut sink = Recorder::default();
        let config = Config::default();

        coordinator.tick(&reading(1), false, &config, &mut sink);
        coordinator.tick(&reading(2), false, &config, &mut sink);
        coordinator.clear();

        let up = coordinator.tick(&reading(3), true, &config, &mut sink);
        assert_eq!(up.drain.unwrap().batches, 0);
        assert!(sink.batches.is_empty());
    }
}
