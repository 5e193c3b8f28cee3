//! Decoding of messages received on the subscribed topics
//!
//! Two topics feed the node:
//!
//! - `{base}/config`: a partial [`ConfigUpdate`], e.g. `{"buffer_size": 30}`.
//!   Unknown keys are ignored.
//!   Each key is checked on its own; an out-of-range value is skipped.
//! - `{base}/commands`: `{"command": "clear_buffer"}`,
//!   `{"command": "reset_config"}` or `{"command": "request_data"}`.
//!
//! Applying a message answers on the status topic the way the firmware
//! does: a full status record after a config change, `{"status": ...}` after
//! a command that changes state.

use envnode_core::node::SampleFilter;
use envnode_core::{Command, Config, ConfigUpdate, SensorNode};
use serde::Deserialize;
use thiserror::Error;

use crate::publisher::MqttPublisher;
use crate::topics::Topics;
use crate::Connector;

/// Reasons an inbound message is dropped
#[derive(Debug, Error)]
pub enum InboundError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Command message without a command field")]
    MissingCommand,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Not an inbound topic: {0}")]
    UnknownTopic(String),
}

/// A decoded inbound message
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Inbound {
    /// Partial configuration update
    Config(ConfigUpdate),
    /// Remote command
    Command(Command),
}

impl Inbound {
    /// Applies the message to the node and its configuration
    ///
    /// Replies go out through `publisher`; a failed reply is counted in its
    /// stats and otherwise ignored. Returns whether `config` changed, so the
    /// caller knows to persist it.
    pub fn apply<F, C>(
        &self,
        node: &mut SensorNode<F>,
        config: &mut Config,
        publisher: &mut MqttPublisher<C>,
    ) -> bool
    where
        F: SampleFilter,
        C: Connector,
    {
        match self {
            Inbound::Config(update) => {
                let changed = update.apply(config);
                if changed {
                    let battery = node.last_reading().map_or(0.0, |r| r.battery_pct);
                    let _ = publisher.publish_status(battery, config);
                }
                changed
            }
            Inbound::Command(command) => {
                let before = *config;
                if let Some(ack) = node.handle_command(*command, config, publisher) {
                    let _ = publisher.publish_status_event(ack.status());
                }
                before != *config
            }
        }
    }
}

#[derive(Deserialize)]
struct CommandEnvelope {
    command: Option<String>,
}

/// Parses a partial config update; unknown keys are ignored
pub fn decode_config(payload: &[u8]) -> Result<ConfigUpdate, InboundError> {
    Ok(serde_json::from_slice(payload)?)
}

/// Parses a `{"command": ...}` message
pub fn decode_command(payload: &[u8]) -> Result<Command, InboundError> {
    let envelope: CommandEnvelope = serde_json::from_slice(payload)?;
    let name = envelope.command.ok_or(InboundError::MissingCommand)?;
    Command::from_name(&name).ok_or(InboundError::UnknownCommand(name))
}

/// Dispatches on the topic a message arrived on
pub fn decode(topics: &Topics, topic: &str, payload: &[u8]) -> Result<Inbound, InboundError> {
    if topic == topics.config() {
        decode_config(payload).map(Inbound::Config)
    } else if topic == topics.commands() {
        decode_command(payload).map(Inbound::Command)
    } else {
        Err(InboundError::UnknownTopic(topic.to_string()))
    }
}
