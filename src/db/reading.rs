use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::{
    core::reading::CompositeReading,
    db::Record,
    quantity::{current::Milliamps, percent::Percent, power::Watts, voltage::Volts},
    telemetry::{DeviceId, Status},
};

/// The device and timestamp identify a reading, so that redelivered snapshots are not duplicated.
#[serde_as]
#[derive(Serialize, Deserialize)]
pub struct SensorReadingId {
    #[serde(rename = "deviceId")]
    pub device_id: DeviceId,

    #[serde_as(as = "bson::serde_helpers::datetime::FromChrono04DateTime")]
    #[serde(rename = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    #[serde(rename = "_id")]
    pub id: SensorReadingId,

    pub battery_voltage: Option<Volts>,
    pub battery_current: Option<Milliamps>,
    pub battery_power: Option<Watts>,
    pub main_voltage: Option<Volts>,
    pub main_current: Option<Milliamps>,
    pub main_power: Option<Watts>,
    pub light_intensity: Option<Percent>,
    pub led_status: Option<Status>,
    pub led2_status: Option<Status>,
    pub led4_status: Option<Status>,
    pub emergency_status: Option<Status>,
    pub power_cut_status: Option<Status>,
}

impl Record for SensorReading {
    const COLLECTION_NAME: &str = "sensorReadings";
}

impl From<&CompositeReading> for SensorReading {
    fn from(reading: &CompositeReading) -> Self {
        Self {
            id: SensorReadingId {
                device_id: reading.device_id.clone(),
                timestamp: reading.observed_at,
            },
            battery_voltage: reading.battery_voltage,
            battery_current: reading.battery_current,
            battery_power: reading.battery_power,
            main_voltage: reading.main_voltage,
            main_current: reading.main_current,
            main_power: reading.main_power,
            light_intensity: reading.light_intensity,
            led_status: reading.led_status,
            led2_status: reading.led2_status,
            led4_status: reading.led4_status,
            emergency_status: reading.emergency_status,
            power_cut_status: reading.power_cut_status,
        }
    }
}
