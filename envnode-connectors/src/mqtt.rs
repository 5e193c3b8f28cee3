//! MQTT connector backed by `rumqttc`
//!
//! The connector owns the publishing half of a `rumqttc` client. The
//! [`Connection`] returned alongside it belongs to the session layer, which
//! iterates it (driving the network) and reports link changes back through
//! [`MqttConnector::observe`] or the shared [`ConnectionFlag`].
//!
//! ```text
//!   session thread                       tick loop
//!   ──────────────                       ─────────
//!   for event in connection.iter() {     node.tick(reading, flag.get(), ..)
//!       flag.observe(&event);                └─► MqttConnector::send
//!       ...                                       └─► Client::try_publish
//!   }
//! ```
//!
//! Publishing never blocks: when the outgoing queue is full the message is
//! refused with [`ConnectorError::QueueFull`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub use rumqttc::QoS;
use rumqttc::{Client, ClientError, Connection, ConnectionError, Event, MqttOptions, Packet};

use crate::topics::Topics;
use crate::{Connector, ConnectorError};

/// Broker and client settings
#[derive(Debug, Clone)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive_secs: u64,
    pub qos: QoS,
    /// Outgoing requests buffered before `send` starts refusing
    pub queue_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "envnode".to_string(),
            keep_alive_secs: 60,
            qos: QoS::AtLeastOnce,
            queue_capacity: 10,
        }
    }
}

impl MqttConfig {
    fn options(&self) -> Result<MqttOptions, ConnectorError> {
        if self.client_id.is_empty() {
            return Err(ConnectorError::ConfigError("empty client id".to_string()));
        }
        if self.keep_alive_secs < 5 {
            return Err(ConnectorError::ConfigError(format!(
                "keep alive {}s below the 5s minimum",
                self.keep_alive_secs
            )));
        }

        let mut options = MqttOptions::new(self.client_id.clone(), self.host.clone(), self.port);
        options.set_keep_alive(Duration::from_secs(self.keep_alive_secs));
        Ok(options)
    }
}

/// Link state shared between the session layer and the connector
#[derive(Debug, Clone, Default)]
pub struct ConnectionFlag(Arc<AtomicBool>);

impl ConnectionFlag {
    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, connected: bool) {
        self.0.store(connected, Ordering::Release);
    }

    /// Tracks ConnAck / Disconnect / errors from the event loop
    pub fn observe(&self, event: &Result<Event, ConnectionError>) {
        match event {
            Ok(Event::Incoming(Packet::ConnAck(_))) => self.set(true),
            Ok(Event::Incoming(Packet::Disconnect)) | Err(_) => self.set(false),
            Ok(_) => {}
        }
    }
}

pub struct MqttConnector {
    client: Client,
    qos: QoS,
    flag: ConnectionFlag,
}

impl MqttConnector {
    /// Builds the client; the caller drives the returned [`Connection`]
    pub fn new(config: &MqttConfig) -> Result<(Self, Connection), ConnectorError> {
        let options = config.options()?;
        let (client, connection) = Client::new(options, config.queue_capacity.max(1));

        log::info!(
            "mqtt client {} for {}:{}",
            config.client_id,
            config.host,
            config.port
        );

        Ok((
            Self {
                client,
                qos: config.qos,
                flag: ConnectionFlag::default(),
            },
            connection,
        ))
    }

    /// Handle for the session layer
    pub fn connection_flag(&self) -> ConnectionFlag {
        self.flag.clone()
    }

    pub fn observe(&self, event: &Result<Event, ConnectionError>) {
        self.flag.observe(event);
    }

    /// Subscribes to the config and command topics
    pub fn subscribe_inbound(&mut self, topics: &Topics) -> Result<(), ConnectorError> {
        for topic in topics.inbound() {
            self.client
                .try_subscribe(topic, self.qos)
                .map_err(map_client_error)?;
        }
        Ok(())
    }

    /// Topic and payload of an incoming publish
    pub fn incoming(event: &Event) -> Option<(&str, &[u8])> {
        match event {
            Event::Incoming(Packet::Publish(publish)) => {
                Some((publish.topic.as_str(), &publish.payload[..]))
            }
            _ => None,
        }
    }
}

impl Connector for MqttConnector {
    fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), ConnectorError> {
        if !self.flag.get() {
            return Err(ConnectorError::NotConnected);
        }
        self.client
            .try_publish(topic, self.qos, false, data.to_vec())
            .map_err(map_client_error)
    }

    fn is_connected(&self) -> bool {
        self.flag.get()
    }
}

fn map_client_error(err: ClientError) -> ConnectorError {
    match err {
        ClientError::TryRequest(_) => ConnectorError::QueueFull,
        other => ConnectorError::ProtocolError(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_config() {
        let config = MqttConfig {
            client_id: String::new(),
            ..MqttConfig::default()
        };
        assert!(matches!(
            MqttConnector::new(&config),
            Err(ConnectorError::ConfigError(_))
        ));

        let config = MqttConfig {
            keep_alive_secs: 1,
            ..MqttConfig::default()
        };
        assert!(MqttConnector::new(&config).is_err());
    }

    #[test]
    fn refuses_until_flag_set() {
        let (mut connector, _connection) = MqttConnector::new(&MqttConfig::default()).unwrap();
        assert!(!connector.is_connected());
        assert!(matches!(
            connector.send("sensors/envnode", b"{}"),
            Err(ConnectorError::NotConnected)
        ));

        let flag = connector.connection_flag();
        flag.set(true);
        assert!(connector.is_connected());
        assert!(connector.send("sensors/envnode", b"{}").is_ok());
    }

    #[test]
    fn errors_clear_flag() {
        let flag = ConnectionFlag::default();
        flag.set(true);
        flag.observe(&Err(ConnectionError::RequestsDone));
        assert!(!flag.get());
    }
}
