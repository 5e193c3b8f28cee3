//! JSON message shapes
//!
//! Field names match the dashboards already consuming envnode traffic, so
//! they are fixed here rather than derived from the core types.
//!
//! ```json
//! {"device_id":"node-01","timestamp":5000,"battery":81.0,"on_battery":true,
//!  "environment":{"temperature":21.4,"humidity":44.0,"heat_index":20.74},
//!  "imu":{"accel_magnitude":1.01},
//!  "gas":{"rs_ratio":1.0,"co_ppm":274.4,"ch4_ppm":3504.6,"lpg_ppm":777.5},
//!  "sound":{"level":512.0}}
//! ```
//!
//! Each live snapshot is mirrored as one InfluxDB line-protocol record:
//!
//! ```text
//! environment,device=node-01,on_battery=true temperature=21.40,humidity=44.00,heat_index=20.74 5000
//! ```

use envnode_core::{Alert, AnomalyAlert, Config, DeviceId, LiveRecord, Reading};
use serde::Serialize;

use crate::ConnectorError;

/// Live snapshot with derived gas estimates
#[derive(Debug, Serialize)]
pub struct LivePayload<'a> {
    pub device_id: &'a str,
    pub timestamp: u64,
    pub battery: f32,
    pub on_battery: bool,
    pub environment: Environment,
    pub imu: Imu,
    pub gas: Gas,
    pub sound: Sound,
}

#[derive(Debug, Serialize)]
pub struct Environment {
    pub temperature: f32,
    pub humidity: f32,
    pub heat_index: f32,
}

#[derive(Debug, Serialize)]
pub struct Imu {
    pub accel_magnitude: f32,
}

#[derive(Debug, Serialize)]
pub struct Gas {
    pub rs_ratio: f32,
    pub co_ppm: f32,
    pub ch4_ppm: f32,
    pub lpg_ppm: f32,
}

#[derive(Debug, Serialize)]
pub struct Sound {
    pub level: f32,
}

impl<'a> LivePayload<'a> {
    pub fn new(device_id: &'a DeviceId, record: &LiveRecord<'_>) -> Self {
        let reading = record.reading;
        Self {
            device_id: device_id.as_str(),
            timestamp: reading.timestamp,
            battery: reading.battery_pct,
            on_battery: reading.on_battery,
            environment: Environment {
                temperature: reading.temperature,
                humidity: reading.humidity,
                heat_index: record.heat_index,
            },
            imu: Imu {
                accel_magnitude: reading.accel_magnitude,
            },
            gas: Gas {
                rs_ratio: reading.gas_ratio,
                co_ppm: record.gas.co_ppm,
                ch4_ppm: record.gas.ch4_ppm,
                lpg_ppm: record.gas.lpg_ppm,
            },
            sound: Sound {
                level: reading.sound_level,
            },
        }
    }
}

/// One buffered snapshot, flat
#[derive(Debug, Serialize)]
pub struct BufferedEntry {
    pub timestamp: u64,
    pub temperature: f32,
    pub humidity: f32,
    pub accel_magnitude: f32,
    pub gas_ratio: f32,
    pub sound_level: f32,
    pub battery: f32,
}

impl From<&Reading> for BufferedEntry {
    fn from(reading: &Reading) -> Self {
        Self {
            timestamp: reading.timestamp,
            temperature: reading.temperature,
            humidity: reading.humidity,
            accel_magnitude: reading.accel_magnitude,
            gas_ratio: reading.gas_ratio,
            sound_level: reading.sound_level,
            battery: reading.battery_pct,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchPayload {
    pub buffered_data: Vec<BufferedEntry>,
}

impl BatchPayload {
    pub fn new(batch: &[Reading]) -> Self {
        Self {
            buffered_data: batch.iter().map(BufferedEntry::from).collect(),
        }
    }
}

/// Z-score alert
#[derive(Debug, Serialize)]
pub struct AnomalyPayload<'a> {
    pub device_id: &'a str,
    pub alert: &'static str,
    pub sensor: &'static str,
    pub timestamp: u64,
    pub value: f32,
    pub mean: f32,
    pub std_dev: f32,
    pub z_score: f32,
}

impl<'a> From<&'a AnomalyAlert> for AnomalyPayload<'a> {
    fn from(alert: &'a AnomalyAlert) -> Self {
        Self {
            device_id: alert.device_id.as_str(),
            alert: "anomaly_detected",
            sensor: alert.channel.name(),
            timestamp: alert.timestamp,
            value: alert.value,
            mean: alert.mean,
            std_dev: alert.std_dev,
            z_score: alert.z_score,
        }
    }
}

/// Spike and battery alerts; exactly one measurement field is set
#[derive(Debug, Serialize)]
pub struct ThresholdAlertPayload<'a> {
    pub device_id: &'a str,
    pub alert: &'static str,
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceleration_magnitude: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_level: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_percentage: Option<f32>,
}

impl<'a> ThresholdAlertPayload<'a> {
    fn empty(alert: &'static str, device_id: &'a DeviceId, timestamp: u64) -> Self {
        Self {
            device_id: device_id.as_str(),
            alert,
            timestamp,
            acceleration_magnitude: None,
            sound_level: None,
            battery_percentage: None,
        }
    }
}

/// Status announcement published after connecting and after config changes
#[derive(Debug, Serialize)]
pub struct StatusPayload<'a> {
    pub device_id: &'a str,
    pub status: &'static str,
    pub firmware_version: &'static str,
    pub battery: f32,
    pub config: &'a Config,
}

/// Acknowledgement of a remote command
#[derive(Debug, Serialize)]
pub struct StatusEventPayload<'a> {
    pub status: &'a str,
}

/// Encoded alert plus which topic family it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedAlert {
    Anomaly(Vec<u8>),
    Threshold(Vec<u8>),
}

pub fn encode_live(device_id: &DeviceId, record: &LiveRecord<'_>) -> Result<Vec<u8>, ConnectorError> {
    to_json(&LivePayload::new(device_id, record))
}

/// Line-protocol record for the environment measurement
pub fn encode_influx(device_id: &DeviceId, record: &LiveRecord<'_>) -> Vec<u8> {
    let reading = record.reading;
    format!(
        "environment,device={},on_battery={} temperature={:.2},humidity={:.2},heat_index={:.2} {}",
        device_id.as_str(),
        reading.on_battery,
        reading.temperature,
        reading.humidity,
        record.heat_index,
        reading.timestamp,
    )
    .into_bytes()
}

pub fn encode_batch(batch: &[Reading]) -> Result<Vec<u8>, ConnectorError> {
    to_json(&BatchPayload::new(batch))
}

pub fn encode_alert(alert: &Alert) -> Result<EncodedAlert, ConnectorError> {
    let kind = alert.kind();

    match alert {
        Alert::Anomaly(anomaly) => Ok(EncodedAlert::Anomaly(to_json(&AnomalyPayload::from(
            anomaly,
        ))?)),
        Alert::VibrationSpike {
            device_id,
            timestamp,
            magnitude,
        } => {
            let payload = ThresholdAlertPayload {
                acceleration_magnitude: Some(*magnitude),
                ..ThresholdAlertPayload::empty(kind, device_id, *timestamp)
            };
            Ok(EncodedAlert::Threshold(to_json(&payload)?))
        }
        Alert::SoundSpike {
            device_id,
            timestamp,
            level,
        } => {
            let payload = ThresholdAlertPayload {
                sound_level: Some(*level),
                ..ThresholdAlertPayload::empty(kind, device_id, *timestamp)
            };
            Ok(EncodedAlert::Threshold(to_json(&payload)?))
        }
        Alert::LowBattery {
            device_id,
            timestamp,
            percentage,
        } => {
            let payload = ThresholdAlertPayload {
                battery_percentage: Some(*percentage),
                ..ThresholdAlertPayload::empty(kind, device_id, *timestamp)
            };
            Ok(EncodedAlert::Threshold(to_json(&payload)?))
        }
    }
}

pub fn encode_status(
    device_id: &DeviceId,
    battery: f32,
    config: &Config,
) -> Result<Vec<u8>, ConnectorError> {
    to_json(&StatusPayload {
        device_id: device_id.as_str(),
        status: "online",
        firmware_version: envnode_core::VERSION,
        battery,
        config,
    })
}

pub fn encode_status_event(status: &str) -> Result<Vec<u8>, ConnectorError> {
    to_json(&StatusEventPayload { status })
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, ConnectorError> {
    serde_json::to_vec(value).map_err(|e| ConnectorError::ProtocolError(e.to_string()))
}
