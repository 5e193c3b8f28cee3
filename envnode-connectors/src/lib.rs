//! Broker Connectors for envnode Sensor Nodes
//!
//! ## Overview
//!
//! `envnode-core` hands finished records to three sink traits and never
//! touches a socket. This crate supplies the other half: it encodes those
//! records as JSON, picks the topic, and passes the bytes to a [`Connector`].
//!
//! ```text
//!  SensorNode::tick ──► LiveSink / BatchSink / AlertSink
//!                                  │
//!                         MqttPublisher<C>   (payload + topics)
//!                                  │
//!                            C: Connector    (MemoryConnector, MqttConnector)
//! ```
//!
//! The reverse direction is covered by [`inbound`]: configuration updates and
//! commands arriving on the subscribed topics are decoded into
//! [`envnode_core::ConfigUpdate`] and [`envnode_core::Command`].
//!
//! ## Topic Layout
//!
//! | topic                      | direction | payload                |
//! |----------------------------|-----------|------------------------|
//! | `{base}`                   | out       | live reading           |
//! | `{base}/buffered_data`     | out       | batch of readings      |
//! | `{base}/anomalies`         | out       | z-score alerts         |
//! | `{base}/alerts`            | out       | spike / battery alerts |
//! | `{base}/status`            | out       | online status + config |
//! | `{base}/config`            | in        | partial config update  |
//! | `{base}/commands`          | in        | `{"command": ...}`     |
//!
//! ## Connection Ownership
//!
//! Connecting, reconnecting and subscribing belong to the session layer of
//! the firmware. Connectors only report whether a session exists and publish
//! into it.
//!
//! ## Example Usage
//!
//! ```rust
//! use envnode_connectors::{MemoryConnector, MqttPublisher, Topics};
//! use envnode_core::{Config, DeviceId, Reading, SensorNode};
//!
//! let config = Config::default();
//! let device = DeviceId::new("node-01").unwrap();
//! let mut node = SensorNode::new(device.clone(), true, &config);
//! let mut publisher = MqttPublisher::new(MemoryConnector::connected(), Topics::default(), device);
//!
//! let reading = Reading::new(1_000).with_temperature(21.0).with_battery(77.0);
//! node.tick(&reading, true, &config, &mut publisher);
//!
//! let sent = publisher.connector().messages_on("sensors/envnode");
//! assert_eq!(sent.len(), 1);
//! ```

pub mod inbound;
pub mod memory;
#[cfg(feature = "mqtt")]
pub mod mqtt;
pub mod payload;
pub mod publisher;
pub mod topics;

// Re-export common types
pub use inbound::{Inbound, InboundError};
pub use memory::{MemoryConnector, Message};
#[cfg(feature = "mqtt")]
pub use mqtt::{ConnectionFlag, MqttConfig, MqttConnector, QoS};
pub use publisher::{ConnectionStats, MqttPublisher};
pub use topics::Topics;

use envnode_core::errors::PublishError;
use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Not connected")]
    NotConnected,

    #[error("Outgoing queue full")]
    QueueFull,

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<ConnectorError> for PublishError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::NotConnected => PublishError::NotConnected,
            ConnectorError::QueueFull => PublishError::Rejected {
                reason: "queue full",
            },
            ConnectorError::ProtocolError(_) | ConnectorError::ConfigError(_) => {
                PublishError::Rejected {
                    reason: "transport error",
                }
            }
        }
    }
}

/// Trait for all transport connectors
pub trait Connector {
    /// Publish raw bytes on a topic
    fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), ConnectorError>;

    /// Whether a broker session currently exists
    fn is_connected(&self) -> bool;
}

impl<C: Connector + ?Sized> Connector for &mut C {
    fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), ConnectorError> {
        (**self).send(topic, data)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}
