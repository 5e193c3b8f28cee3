//! In-process connector
//!
//! Keeps every published message in order. Used by tests and by host-side
//! simulations that want to inspect the traffic a node would produce.

use crate::{Connector, ConnectorError};

/// One published message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl Message {
    /// Payload as UTF-8, empty if it is not valid text
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.payload).unwrap_or("")
    }
}

/// Connector that records instead of transmitting
#[derive(Debug, Default)]
pub struct MemoryConnector {
    messages: Vec<Message>,
    connected: bool,
}

impl MemoryConnector {
    /// Starts disconnected
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn messages_on(&self, topic: &str) -> Vec<&Message> {
        self.messages.iter().filter(|m| m.topic == topic).collect()
    }

    /// Removes and returns everything recorded so far
    pub fn take(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }
}

impl Connector for MemoryConnector {
    fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), ConnectorError> {
        if !self.connected {
            return Err(ConnectorError::NotConnected);
        }
        self.messages.push(Message {
            topic: topic.to_string(),
            payload: data.to_vec(),
        });
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_while_disconnected() {
        let mut connector = MemoryConnector::new();
        assert!(matches!(
            connector.send("a", b"x"),
            Err(ConnectorError::NotConnected)
        ));
        assert!(connector.messages().is_empty());
    }

    #[test]
    fn records_in_order() {
        let mut connector = MemoryConnector::connected();
        connector.send("a", b"1").unwrap();
        connector.send("b", b"2").unwrap();
        connector.send("a", b"3").unwrap();

        let on_a: Vec<_> = connector.messages_on("a").iter().map(|m| m.text()).collect();
        assert_eq!(on_a, vec!["1", "3"]);

        let all = connector.take();
        assert_eq!(all.len(), 3);
        assert!(connector.messages().is_empty());
    }
}
