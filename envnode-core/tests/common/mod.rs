//! Shared fixtures for the integration tests
//!
//! - `RecordingSink` captures every publish in order
//! - `ReadingGenerator` produces plausible snapshots on a mock clock

#![allow(dead_code)]

use envnode_core::{
    alert::Alert,
    errors::{PublishError, PublishResult},
    reading::Reading,
    sink::{AlertSink, BatchSink, LiveRecord, LiveSink},
    time::{MockTimeSource, TimeSource, Timestamp},
};

/// One publish as seen by the sink
#[derive(Debug, Clone, PartialEq)]
pub enum Published {
    Live(Timestamp),
    Batch(Vec<Timestamp>),
    Alert(&'static str, Timestamp),
}

/// Records every call in arrival order
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub log: Vec<Published>,
    pub alerts: Vec<Alert>,
    /// Reject every batch publish
    pub fail_batches: bool,
}

impl RecordingSink {
    pub fn live(&self) -> Vec<Timestamp> {
        self.log
            .iter()
            .filter_map(|p| match p {
                Published::Live(ts) => Some(*ts),
                _ => None,
            })
            .collect()
    }

    pub fn batches(&self) -> Vec<Vec<Timestamp>> {
        self.log
            .iter()
            .filter_map(|p| match p {
                Published::Batch(batch) => Some(batch.clone()),
                _ => None,
            })
            .collect()
    }

    /// Live and batch publishes only, alerts left out
    pub fn data_log(&self) -> Vec<Published> {
        self.log
            .iter()
            .filter(|p| !matches!(p, Published::Alert(..)))
            .cloned()
            .collect()
    }

    pub fn alert_kinds(&self) -> Vec<&'static str> {
        self.alerts.iter().map(|a| a.kind()).collect()
    }
}

impl LiveSink for RecordingSink {
    fn publish_live(&mut self, record: &LiveRecord<'_>) -> PublishResult {
        self.log.push(Published::Live(record.reading.timestamp));
        Ok(())
    }
}

impl BatchSink for RecordingSink {
    fn publish_batch(&mut self, batch: &[Reading]) -> PublishResult {
        self.log
            .push(Published::Batch(batch.iter().map(|r| r.timestamp).collect()));
        if self.fail_batches {
            Err(PublishError::NotConnected)
        } else {
            Ok(())
        }
    }
}

impl AlertSink for RecordingSink {
    fn publish_alert(&mut self, alert: &Alert) -> PublishResult {
        self.log.push(Published::Alert(alert.kind(), alert.timestamp()));
        self.alerts.push(alert.clone());
        Ok(())
    }
}

/// Deterministic snapshot generator
pub struct ReadingGenerator {
    clock: MockTimeSource,
    interval_ms: u64,
    seed: u32,
}

impl ReadingGenerator {
    pub fn new(start: Timestamp, interval_ms: u64) -> Self {
        Self {
            clock: MockTimeSource::new(start),
            interval_ms,
            seed: 42,
        }
    }

    /// Indoor conditions with a little noise on every channel
    pub fn next_calm(&mut self) -> Reading {
        let reading = Reading::new(self.clock.now())
            .with_temperature(21.0 + self.noise(0.5))
            .with_humidity(45.0 + self.noise(2.0))
            .with_accel_magnitude(1.0 + self.noise(0.02))
            .with_gas_ratio(1.0 + self.noise(0.05))
            .with_sound_level(500.0 + self.noise(100.0))
            .with_battery(85.0);
        self.clock.advance(self.interval_ms);
        reading
    }

    /// Calm snapshot with the temperature replaced
    pub fn next_with_temperature(&mut self, celsius: f32) -> Reading {
        self.next_calm().with_temperature(celsius)
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Uniform noise in `[-amplitude, amplitude]`
    fn noise(&mut self, amplitude: f32) -> f32 {
        self.seed = self.seed.wrapping_mul(1664525).wrapping_add(1013904223);
        let uniform = (self.seed as f32) / (u32::MAX as f32);
        (uniform - 0.5) * 2.0 * amplitude
    }
}
