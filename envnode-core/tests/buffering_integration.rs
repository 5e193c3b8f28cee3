//! Integration tests for offline buffering
//!
//! Drives the ring buffer, the coordinator and the full node through link
//! outages and checks what reaches the sinks.

mod common;

use common::{Published, ReadingGenerator, RecordingSink};
use envnode_core::{
    buffer::OfflineRingBuffer,
    node::{Command, CommandAck},
    Config, DeviceId, LinkState, Reading, SensorNode, TickRoute,
};

fn node(connected: bool, config: &Config) -> SensorNode {
    SensorNode::new(DeviceId::new("it-node").unwrap(), connected, config)
}

#[test]
fn test_overwrite_then_drain_in_pairs() {
    let mut buffer: OfflineRingBuffer<50> = OfflineRingBuffer::with_capacity(5);
    for ts in 1..=10 {
        buffer.push(Reading::new(ts));
    }

    let mut sink = RecordingSink::default();
    let report = buffer.drain_batch(2, &mut sink);

    assert_eq!(sink.batches(), vec![vec![6, 7], vec![8, 9], vec![10]]);
    assert_eq!(report.batches, 3);
    assert_eq!(report.readings, 5);
    assert!(buffer.is_empty());
    assert_eq!(buffer.stats().overwritten, 5);
}

#[test]
fn test_outage_and_recovery() {
    let config = Config::default();
    let mut node = node(true, &config);
    let mut sink = RecordingSink::default();
    let mut gen = ReadingGenerator::new(10_000, 1_000);

    let first = gen.next_calm();
    node.tick(&first, true, &config, &mut sink);

    let mut captured = Vec::new();
    for _ in 0..3 {
        let reading = gen.next_calm();
        captured.push(reading.timestamp);
        let report = node.tick(&reading, false, &config, &mut sink);
        assert!(matches!(report.route, TickRoute::Buffered(_)));
    }
    assert_eq!(node.link_state(), LinkState::Buffering);
    assert_eq!(node.coordinator().buffer().len(), 3);

    let back = gen.next_calm();
    let report = node.tick(&back, true, &config, &mut sink);

    assert_eq!(report.transition, Some(LinkState::Live));
    assert_eq!(report.drain.map(|d| d.readings), Some(3));
    assert!(node.coordinator().buffer().is_empty());

    assert_eq!(
        sink.data_log(),
        vec![
            Published::Live(first.timestamp),
            Published::Batch(captured),
            Published::Live(back.timestamp),
        ]
    );
}

#[test]
fn test_long_outage_keeps_newest() {
    let config = Config {
        buffer_capacity: 10,
        batch_size: 4,
        ..Config::default()
    };
    let mut node = node(false, &config);
    let mut sink = RecordingSink::default();
    let mut gen = ReadingGenerator::new(0, 500);

    let mut timestamps = Vec::new();
    for _ in 0..25 {
        let reading = gen.next_calm();
        timestamps.push(reading.timestamp);
        node.tick(&reading, false, &config, &mut sink);
    }

    node.tick(&gen.next_calm(), true, &config, &mut sink);

    let batches = sink.batches();
    assert_eq!(batches.iter().map(Vec::len).collect::<Vec<_>>(), vec![4, 4, 2]);
    assert_eq!(batches.concat(), timestamps[15..].to_vec());
}

#[test]
fn test_failed_batches_are_not_retried() {
    let config = Config {
        batch_size: 2,
        ..Config::default()
    };
    let mut node = node(false, &config);
    let mut sink = RecordingSink {
        fail_batches: true,
        ..RecordingSink::default()
    };
    let mut gen = ReadingGenerator::new(0, 1_000);

    for _ in 0..5 {
        node.tick(&gen.next_calm(), false, &config, &mut sink);
    }

    let report = node.tick(&gen.next_calm(), true, &config, &mut sink);
    let drain = report.drain.unwrap();
    assert_eq!(drain.batches, 3);
    assert_eq!(drain.failed_batches, 3);
    assert!(node.coordinator().buffer().is_empty());

    // Flapping the link does not resend anything
    node.tick(&gen.next_calm(), false, &config, &mut sink);
    let report = node.tick(&gen.next_calm(), true, &config, &mut sink);
    assert_eq!(report.drain.unwrap().readings, 1);
}

#[test]
fn test_clear_buffer_command_mid_outage() {
    let mut config = Config::default();
    let mut node = node(false, &config);
    let mut sink = RecordingSink::default();
    let mut gen = ReadingGenerator::new(0, 1_000);

    for _ in 0..4 {
        node.tick(&gen.next_calm(), false, &config, &mut sink);
    }
    let ack = node.handle_command(Command::ClearBuffer, &mut config, &mut sink);
    assert_eq!(ack, Some(CommandAck::BufferCleared));

    let survivor = gen.next_calm();
    node.tick(&survivor, false, &config, &mut sink);
    node.tick(&gen.next_calm(), true, &config, &mut sink);

    assert_eq!(sink.batches(), vec![vec![survivor.timestamp]]);
}

#[test]
fn test_boot_offline_then_connect() {
    let config = Config::default();
    let mut node = node(false, &config);
    let mut sink = RecordingSink::default();
    let mut gen = ReadingGenerator::new(0, 1_000);

    assert_eq!(node.link_state(), LinkState::Buffering);
    let offline = gen.next_calm();
    node.tick(&offline, false, &config, &mut sink);
    assert!(sink.data_log().is_empty());

    let online = gen.next_calm();
    node.tick(&online, true, &config, &mut sink);
    assert_eq!(sink.batches(), vec![vec![offline.timestamp]]);
    assert_eq!(sink.live(), vec![online.timestamp]);
}
