//! Sensor Node Context
//!
//! ## Overview
//!
//! [`SensorNode`] owns every piece of mutable engine state: the per-channel
//! windows, the alert detectors and the buffer coordinator. The surrounding
//! firmware calls [`SensorNode::tick`] once per sampling period with the
//! current snapshot, the link status and the live configuration.
//!
//! ## Tick Order
//!
//! ```text
//!  Reading ──► SampleFilter ──► anomaly checks ──► windows.update ─┐
//!                  │ (rejected)                                    │
//!                  └───────────────────────────────────────────────┤
//!                                                                  ▼
//!                                spike checks ──► battery monitor ──► coordinator
//!                                                                     (live / buffer)
//! ```
//!
//! The anomaly checks judge the current value against the windows as they
//! stood before it arrived. A value included in its own window can sit at
//! most `(N - 1) / sqrt(N)` standard deviations from the mean, which for a
//! ten-sample window is below the default multiplier of 3.
//!
//! A snapshot the filter rejects as a whole skips every check but is still
//! routed, so the backlog stays complete.
//!
//! ## Example
//!
//! ```rust
//! use envnode_core::alert::{Alert, DeviceId};
//! use envnode_core::config::Config;
//! use envnode_core::errors::PublishResult;
//! use envnode_core::node::SensorNode;
//! use envnode_core::reading::Reading;
//! use envnode_core::sink::{AlertSink, BatchSink, LiveRecord, LiveSink};
//!
//! #[derive(Default)]
//! struct Count { live: usize, alerts: usize }
//! impl LiveSink for Count {
//!     fn publish_live(&mut self, _: &LiveRecord<'_>) -> PublishResult { self.live += 1; Ok(()) }
//! }
//! impl BatchSink for Count {
//!     fn publish_batch(&mut self, _: &[Reading]) -> PublishResult { Ok(()) }
//! }
//! impl AlertSink for Count {
//!     fn publish_alert(&mut self, _: &Alert) -> PublishResult { self.alerts += 1; Ok(()) }
//! }
//!
//! let config = Config::default();
//! let mut node = SensorNode::new(DeviceId::new("node-1").unwrap(), true, &config);
//! let mut sink = Count::default();
//!
//! let reading = Reading::new(1_000).with_temperature(21.5).with_battery(80.0);
//! node.tick(&reading, true, &config, &mut sink);
//! assert_eq!(sink.live, 1);
//! assert_eq!(sink.alerts, 0);
//! ```

use crate::alert::{Alert, DeviceId};
use crate::anomaly::AnomalyDetector;
use crate::battery::BatteryMonitor;
use crate::buffer::DrainReport;
use crate::config::Config;
use crate::constants::{HISTORY_SIZE, MAX_BUFFER_SIZE};
use crate::coordinator::{BufferCoordinator, LinkState, TickRoute};
use crate::reading::{Channel, Reading};
use crate::sink::{AlertSink, BatchSink, LiveRecord, LiveSink};
use crate::spikes::SpikeDetector;
use crate::stats::ChannelHistories;

/// Decides which values reach the statistics windows
pub trait SampleFilter {
    /// Whether the snapshot is analysed at all
    fn admit_reading(&self, reading: &Reading) -> bool {
        reading.valid
    }

    /// Whether one channel value enters its window
    fn admit(&self, channel: Channel, value: f32) -> bool;
}

/// Drops snapshots flagged invalid and any non-finite channel value
#[derive(Debug, Clone, Copy, Default)]
pub struct FiniteOnly;

impl SampleFilter for FiniteOnly {
    fn admit(&self, _channel: Channel, value: f32) -> bool {
        value.is_finite()
    }
}

/// Admits everything, NaN included
#[derive(Debug, Clone, Copy, Default)]
pub struct AdmitAll;

impl SampleFilter for AdmitAll {
    fn admit_reading(&self, _reading: &Reading) -> bool {
        true
    }

    fn admit(&self, _channel: Channel, _value: f32) -> bool {
        true
    }
}

/// Remote commands the engine acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Command {
    /// Drop the offline backlog
    ClearBuffer,
    /// Restore firmware defaults
    ResetConfig,
    /// Publish the latest snapshot immediately
    RequestData,
}

impl Command {
    /// Every command the engine understands
    pub const ALL: [Command; 3] = [
        Command::ClearBuffer,
        Command::ResetConfig,
        Command::RequestData,
    ];

    /// Name used in `{"command": ...}` messages
    pub const fn name(&self) -> &'static str {
        match self {
            Command::ClearBuffer => "clear_buffer",
            Command::ResetConfig => "reset_config",
            Command::RequestData => "request_data",
        }
    }

    /// Inverse of [`Command::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.name() == name)
    }
}

/// Acknowledgement owed to the remote side after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAck {
    /// The offline backlog was dropped
    BufferCleared,
    /// Defaults were restored
    ConfigReset,
}

impl CommandAck {
    /// Value of the `status` field in the acknowledgement message
    pub const fn status(&self) -> &'static str {
        match self {
            CommandAck::BufferCleared => "buffer_cleared",
            CommandAck::ConfigReset => "config_reset",
        }
    }
}

/// Summary of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Where the snapshot went
    pub route: TickRoute,
    /// Link change seen on this tick
    pub transition: Option<LinkState>,
    /// Backlog flushed on reconnect
    pub drain: Option<DrainReport>,
    /// Channel windows that received a value
    pub channels_updated: usize,
    /// Alerts handed to the sink
    pub alerts_raised: usize,
    /// Alerts the sink refused
    pub alerts_failed: usize,
}

/// All mutable engine state for one node
#[derive(Debug, Clone)]
pub struct SensorNode<F: SampleFilter = FiniteOnly> {
    histories: ChannelHistories<HISTORY_SIZE>,
    anomalies: AnomalyDetector,
    spikes: SpikeDetector,
    battery: BatteryMonitor,
    coordinator: BufferCoordinator<MAX_BUFFER_SIZE>,
    filter: F,
    last_reading: Option<Reading>,
}

impl SensorNode<FiniteOnly> {
    /// Node with the default [`FiniteOnly`] filter
    pub fn new(device_id: DeviceId, connected: bool, config: &Config) -> Self {
        Self::with_filter(device_id, connected, config, FiniteOnly)
    }
}

impl<F: SampleFilter> SensorNode<F> {
    /// Node with a custom ingest filter
    pub fn with_filter(device_id: DeviceId, connected: bool, config: &Config, filter: F) -> Self {
        log_info!(
            "sensor node starting, link {}",
            if connected { "up" } else { "down" }
        );

        Self {
            histories: ChannelHistories::new(),
            anomalies: AnomalyDetector::new(device_id.clone()),
            spikes: SpikeDetector::new(device_id.clone()),
            battery: BatteryMonitor::new(device_id),
            coordinator: BufferCoordinator::new(connected, config.buffer_capacity),
            filter,
            last_reading: None,
        }
    }

    /// Swaps in a detector with a different channel list
    pub fn with_anomaly_detector(mut self, detector: AnomalyDetector) -> Self {
        self.anomalies = detector;
        self
    }

    /// Runs one full cycle for `reading`
    pub fn tick<P>(
        &mut self,
        reading: &Reading,
        connected: bool,
        config: &Config,
        sink: &mut P,
    ) -> TickReport
    where
        P: LiveSink + BatchSink + AlertSink + ?Sized,
    {
        self.last_reading = Some(*reading);

        let mut channels_updated = 0;
        let mut alerts_raised = 0;
        let mut alerts_failed = 0;

        let mut emit = |alert: &Alert, sink: &mut P| {
            alerts_raised += 1;
            if sink.publish_alert(alert).is_err() {
                alerts_failed += 1;
                log_warn!("{} alert not published", alert.kind());
            }
        };

        if self.filter.admit_reading(reading) {
            if config.anomaly_detection {
                let alerts =
                    self.anomalies
                        .evaluate(reading, &self.histories, config.anomaly_multiplier);
                for alert in alerts {
                    emit(&Alert::Anomaly(alert), &mut *sink);
                }
            }

            let filter = &self.filter;
            channels_updated = self
                .histories
                .ingest(reading, |channel, value| filter.admit(channel, value));

            for alert in self.spikes.check(reading, config) {
                emit(&alert, &mut *sink);
            }

            if let Some(alert) = self.battery.check(reading) {
                emit(&alert, &mut *sink);
            }
        } else {
            log_debug!("reading at {} rejected by filter", reading.timestamp);
        }

        let outcome = self.coordinator.tick(reading, connected, config, sink);

        TickReport {
            route: outcome.route,
            transition: outcome.transition,
            drain: outcome.drain,
            channels_updated,
            alerts_raised,
            alerts_failed,
        }
    }

    /// Applies a remote command
    ///
    /// `RequestData` republishes the latest snapshot through `sink` while the
    /// link is live; offline it is a no-op since the snapshot is already
    /// buffered.
    pub fn handle_command<P>(
        &mut self,
        command: Command,
        config: &mut Config,
        sink: &mut P,
    ) -> Option<CommandAck>
    where
        P: LiveSink + ?Sized,
    {
        log_info!("command received: {}", command.name());
        match command {
            Command::ClearBuffer => {
                self.coordinator.clear();
                Some(CommandAck::BufferCleared)
            }
            Command::ResetConfig => {
                *config = Config::default();
                Some(CommandAck::ConfigReset)
            }
            Command::RequestData => {
                match (self.last_reading, self.coordinator.state()) {
                    (Some(reading), LinkState::Live) => {
                        if sink.publish_live(&LiveRecord::new(&reading)).is_err() {
                            log_warn!("requested publish failed");
                        }
                    }
                    (None, _) => log_debug!("no snapshot to publish yet"),
                    (Some(_), LinkState::Buffering) => log_debug!("link down, request ignored"),
                }
                None
            }
        }
    }

    /// Snapshot seen by the most recent tick
    pub fn last_reading(&self) -> Option<&Reading> {
        self.last_reading.as_ref()
    }

    /// Per-channel windows
    pub fn histories(&self) -> &ChannelHistories<HISTORY_SIZE> {
        &self.histories
    }

    /// Link state machine and offline buffer
    pub fn coordinator(&self) -> &BufferCoordinator<MAX_BUFFER_SIZE> {
        &self.coordinator
    }

    /// Low-battery alarm state
    pub fn battery(&self) -> &BatteryMonitor {
        &self.battery
    }

    /// Identity stamped on alerts
    pub fn device_id(&self) -> &DeviceId {
        self.anomalies.device_id()
    }

    /// Shortcut for `coordinator().state()`
    pub fn link_state(&self) -> LinkState {
        self.coordinator.state()
    }
}
