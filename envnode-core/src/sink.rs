//! Publish interfaces toward the network collaborator
//!
//! The core never touches a socket. It hands finished records to three sinks,
//! one per message family, and lets the implementation decide on encoding,
//! topic and transport.
//!
//! Every sink returns a [`PublishResult`]. The core logs and counts failures;
//! it never retries.

use crate::alert::Alert;
use crate::errors::PublishResult;
use crate::gas::GasEstimates;
use crate::heat::heat_index;
use crate::reading::Reading;

/// A live snapshot plus the fields derived from it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveRecord<'a> {
    /// The snapshot as sampled
    pub reading: &'a Reading,
    /// Gas concentrations estimated from the ratio
    pub gas: GasEstimates,
    /// Apparent temperature (°C)
    pub heat_index: f32,
}

impl<'a> LiveRecord<'a> {
    /// Derives the extra fields from `reading`
    pub fn new(reading: &'a Reading) -> Self {
        Self {
            reading,
            gas: GasEstimates::from_ratio(reading.gas_ratio),
            heat_index: heat_index(reading.temperature, reading.humidity),
        }
    }
}

/// Receives one snapshot per tick while the link is up
pub trait LiveSink {
    /// Publishes a live snapshot
    fn publish_live(&mut self, record: &LiveRecord<'_>) -> PublishResult;
}

/// Receives ordered runs of buffered snapshots during a drain
pub trait BatchSink {
    /// `batch` is oldest-first and never empty
    fn publish_batch(&mut self, batch: &[Reading]) -> PublishResult;
}

/// Receives threshold, statistical and battery alerts
pub trait AlertSink {
    /// Publishes one alert
    fn publish_alert(&mut self, alert: &Alert) -> PublishResult;
}

impl<T: LiveSink + ?Sized> LiveSink for &mut T {
    fn publish_live(&mut self, record: &LiveRecord<'_>) -> PublishResult {
        (**self).publish_live(record)
    }
}

impl<T: BatchSink + ?Sized> BatchSink for &mut T {
    fn publish_batch(&mut self, batch: &[Reading]) -> PublishResult {
        (**self).publish_batch(batch)
    }
}

impl<T: AlertSink + ?Sized> AlertSink for &mut T {
    fn publish_alert(&mut self, alert: &Alert) -> PublishResult {
        (**self).publish_alert(alert)
    }
}
