//! End-to-end: node ticks through the publisher into a memory connector

use envnode_connectors::{inbound, MemoryConnector, MqttPublisher, Topics};
use envnode_core::{Config, DeviceId, LinkState, Reading, SensorNode};
use serde_json::Value;

fn setup(connected: bool) -> (SensorNode, MqttPublisher<MemoryConnector>, Config) {
    let config = Config::default();
    let device = DeviceId::new("field-07").unwrap();
    let node = SensorNode::new(device.clone(), connected, &config);

    let mut connector = MemoryConnector::new();
    connector.set_connected(connected);
    let publisher = MqttPublisher::new(connector, Topics::default(), device);

    (node, publisher, config)
}

fn reading(ts: u64) -> Reading {
    Reading::new(ts)
        .with_temperature(21.0)
        .with_humidity(50.0)
        .with_accel_magnitude(1.0)
        .with_gas_ratio(1.0)
        .with_sound_level(300.0)
        .with_battery(70.0)
}

#[test]
fn test_outage_replayed_as_json_batches() {
    let (mut node, mut publisher, config) = setup(true);

    node.tick(&reading(1_000), true, &config, &mut publisher);

    publisher.connector_mut().set_connected(false);
    for ts in [2_000, 3_000, 4_000] {
        node.tick(&reading(ts), false, &config, &mut publisher);
    }
    assert_eq!(node.link_state(), LinkState::Buffering);

    publisher.connector_mut().set_connected(true);
    node.tick(&reading(5_000), true, &config, &mut publisher);

    let connector = publisher.connector();
    let live = connector.messages_on("sensors/envnode");
    let batches = connector.messages_on("sensors/envnode/buffered_data");
    assert_eq!(live.len(), 2);
    assert_eq!(batches.len(), 1);
    assert_eq!(connector.messages_on("sensors/influx/environment").len(), 2);

    let json: Value = serde_json::from_slice(&batches[0].payload).unwrap();
    let stamps: Vec<u64> = json["buffered_data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["timestamp"].as_u64().unwrap())
        .collect();
    assert_eq!(stamps, vec![2_000, 3_000, 4_000]);

    let order: Vec<&str> = connector.messages().iter().map(|m| m.topic.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "sensors/envnode",
            "sensors/influx/environment",
            "sensors/envnode/buffered_data",
            "sensors/envnode",
            "sensors/influx/environment",
        ]
    );
}

#[test]
fn test_remote_buffer_size_and_clear() {
    let (mut node, mut publisher, mut config) = setup(false);
    let topics = Topics::default();

    for ts in 1..=8u64 {
        node.tick(&reading(ts * 1_000), false, &config, &mut publisher);
    }

    let update = inbound::decode(&topics, topics.config(), br#"{"buffer_size": 3}"#).unwrap();
    assert!(update.apply(&mut node, &mut config, &mut publisher));

    node.tick(&reading(9_000), false, &config, &mut publisher);
    assert_eq!(node.coordinator().buffer().len(), 3);

    let clear = inbound::decode(&topics, topics.commands(), br#"{"command":"clear_buffer"}"#).unwrap();
    assert!(!clear.apply(&mut node, &mut config, &mut publisher));
    assert!(node.coordinator().buffer().is_empty());

    let reset = inbound::decode(&topics, topics.commands(), br#"{"command":"reset_config"}"#).unwrap();
    assert!(reset.apply(&mut node, &mut config, &mut publisher));
    assert_eq!(config, Config::default());
}

#[test]
fn test_out_of_range_buffer_size_keeps_other_keys() {
    let (mut node, mut publisher, mut config) = setup(true);
    let topics = Topics::default();

    for payload in [
        &br#"{"accel_threshold": 2.0, "buffer_size": 0}"#[..],
        &br#"{"buffer_size": 500, "anomaly_threshold": 4.0}"#[..],
    ] {
        let update = inbound::decode(&topics, topics.config(), payload).unwrap();
        assert!(update.apply(&mut node, &mut config, &mut publisher));
    }

    assert_eq!(config.accel_threshold, 2.0);
    assert_eq!(config.anomaly_multiplier, 4.0);
    assert_eq!(config.buffer_capacity, Config::default().buffer_capacity);

    // every accepted change is announced with the full status record
    let status = publisher.connector().messages_on("sensors/envnode/status");
    assert_eq!(status.len(), 2);
    let json: Value = serde_json::from_slice(&status[1].payload).unwrap();
    assert_eq!(json["status"], "online");
    assert_eq!(json["config"]["accel_threshold"], 2.0);
}

#[test]
fn test_commands_acknowledged_on_status() {
    let (mut node, mut publisher, mut config) = setup(true);
    let topics = Topics::default();

    for command in ["clear_buffer", "reset_config"] {
        let payload = format!(r#"{{"command":"{}"}}"#, command);
        let message = inbound::decode(&topics, topics.commands(), payload.as_bytes()).unwrap();
        message.apply(&mut node, &mut config, &mut publisher);
    }

    let acks: Vec<&str> = publisher
        .connector()
        .messages_on("sensors/envnode/status")
        .into_iter()
        .map(|m| m.text())
        .collect();
    assert_eq!(
        acks,
        vec![r#"{"status":"buffer_cleared"}"#, r#"{"status":"config_reset"}"#]
    );
}

#[test]
fn test_request_data_publishes_latest_reading() {
    let (mut node, mut publisher, mut config) = setup(true);
    let topics = Topics::default();

    node.tick(&reading(4_200), true, &config, &mut publisher);
    publisher.connector_mut().take();

    let request = inbound::decode(&topics, topics.commands(), br#"{"command":"request_data"}"#).unwrap();
    assert!(!request.apply(&mut node, &mut config, &mut publisher));

    let connector = publisher.connector();
    let live = connector.messages_on("sensors/envnode");
    assert_eq!(live.len(), 1);
    let json: Value = serde_json::from_slice(&live[0].payload).unwrap();
    assert_eq!(json["timestamp"], 4_200);

    let influx = connector.messages_on("sensors/influx/environment");
    assert_eq!(influx.len(), 1);
    assert!(influx[0]
        .text()
        .starts_with("environment,device=field-07,on_battery=false temperature=21.00,humidity=50.00,"));
    assert!(influx[0].text().ends_with(" 4200"));

    // no acknowledgement for a data request
    assert!(connector.messages_on("sensors/envnode/status").is_empty());
}

#[test]
fn test_alerts_reach_their_topics() {
    let (mut node, mut publisher, config) = setup(true);

    node.tick(&reading(1).with_accel_magnitude(3.5), true, &config, &mut publisher);
    node.tick(&reading(2).with_battery(9.0), true, &config, &mut publisher);

    let alerts = publisher.connector().messages_on("sensors/envnode/alerts");
    let kinds: Vec<String> = alerts
        .iter()
        .map(|m| {
            let json: Value = serde_json::from_slice(&m.payload).unwrap();
            json["alert"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(kinds, vec!["vibration_spike", "low_battery"]);

    let status_before = publisher.stats().messages_sent;
    publisher.publish_status(9.0, &config).unwrap();
    assert_eq!(publisher.stats().messages_sent, status_before + 1);
}
