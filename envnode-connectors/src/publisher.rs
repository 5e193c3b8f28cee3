//! Sink implementation on top of any [`Connector`]
//!
//! `MqttPublisher` is the object handed to `SensorNode::tick`. It implements
//! all three core sink traits, encodes each record with [`crate::payload`]
//! and routes it to the matching topic.
//!
//! Failures are counted in [`ConnectionStats`] and returned to the core as a
//! [`PublishError`]; nothing is queued or retried here.
//!
//! A live snapshot that reaches the broker is followed by its line-protocol
//! mirror on [`Topics::influx`]. The mirror is best effort: its failure is
//! counted but does not fail the live publish.

use envnode_core::errors::{PublishError, PublishResult};
use envnode_core::{Alert, AlertSink, BatchSink, Config, DeviceId, LiveRecord, LiveSink, Reading};
use log::{debug, warn};

use crate::payload::{self, EncodedAlert};
use crate::topics::Topics;
use crate::{Connector, ConnectorError};

/// Traffic counters for one publisher
#[derive(Debug, Default, Clone)]
pub struct ConnectionStats {
    /// Total messages sent successfully
    pub messages_sent: u64,
    /// Total messages the connector refused
    pub messages_failed: u64,
    /// Payload bytes sent
    pub bytes_sent: u64,
    /// Last error message
    pub last_error: Option<String>,
}

pub struct MqttPublisher<C: Connector> {
    connector: C,
    topics: Topics,
    device_id: DeviceId,
    stats: ConnectionStats,
}

impl<C: Connector> MqttPublisher<C> {
    pub fn new(connector: C, topics: Topics, device_id: DeviceId) -> Self {
        Self {
            connector,
            topics,
            device_id,
            stats: ConnectionStats::default(),
        }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn connector_mut(&mut self) -> &mut C {
        &mut self.connector
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    pub fn into_connector(self) -> C {
        self.connector
    }

    /// Announces the node and its active configuration
    pub fn publish_status(&mut self, battery: f32, config: &Config) -> Result<(), ConnectorError> {
        let bytes = payload::encode_status(&self.device_id, battery, config)?;
        let topic = self.topics.status().to_string();
        self.send(&topic, &bytes)
    }

    /// Acknowledges a remote command with `{"status": ...}`
    pub fn publish_status_event(&mut self, status: &str) -> Result<(), ConnectorError> {
        let bytes = payload::encode_status_event(status)?;
        let topic = self.topics.status().to_string();
        self.send(&topic, &bytes)
    }

    fn send(&mut self, topic: &str, bytes: &[u8]) -> Result<(), ConnectorError> {
        match self.connector.send(topic, bytes) {
            Ok(()) => {
                self.stats.messages_sent += 1;
                self.stats.bytes_sent += bytes.len() as u64;
                debug!("published {} bytes to {}", bytes.len(), topic);
                Ok(())
            }
            Err(err) => {
                self.stats.messages_failed += 1;
                self.stats.last_error = Some(err.to_string());
                warn!("publish to {} failed: {}", topic, err);
                Err(err)
            }
        }
    }

    fn encoded<T>(&mut self, encoded: Result<T, ConnectorError>) -> Result<T, PublishError> {
        encoded.map_err(|err| {
            self.stats.messages_failed += 1;
            self.stats.last_error = Some(err.to_string());
            warn!("payload encoding failed: {}", err);
            PublishError::Encoding
        })
    }
}

impl<C: Connector> LiveSink for MqttPublisher<C> {
    fn publish_live(&mut self, record: &LiveRecord<'_>) -> PublishResult {
        let bytes = self.encoded(payload::encode_live(&self.device_id, record))?;
        let topic = self.topics.data().to_string();
        self.send(&topic, &bytes).map_err(PublishError::from)?;

        let line = payload::encode_influx(&self.device_id, record);
        let influx = self.topics.influx().to_string();
        let _ = self.send(&influx, &line);
        Ok(())
    }
}

impl<C: Connector> BatchSink for MqttPublisher<C> {
    fn publish_batch(&mut self, batch: &[Reading]) -> PublishResult {
        let bytes = self.encoded(payload::encode_batch(batch))?;
        let topic = self.topics.buffered_data().to_string();
        self.send(&topic, &bytes).map_err(PublishError::from)
    }
}

impl<C: Connector> AlertSink for MqttPublisher<C> {
    fn publish_alert(&mut self, alert: &Alert) -> PublishResult {
        let (topic, bytes) = match self.encoded(payload::encode_alert(alert))? {
            EncodedAlert::Anomaly(bytes) => (self.topics.anomalies().to_string(), bytes),
            EncodedAlert::Threshold(bytes) => (self.topics.alerts().to_string(), bytes),
        };
        self.send(&topic, &bytes).map_err(PublishError::from)
    }
}
