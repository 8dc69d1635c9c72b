use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::{
    core::power_cut::PowerCutEvent,
    db::Record,
    prelude::*,
    quantity::{energy::MilliwattHours, voltage::Volts},
    telemetry::DeviceId,
};

#[serde_as]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerCut {
    pub device_id: DeviceId,

    #[serde_as(as = "bson::serde_helpers::datetime::FromChrono04DateTime")]
    pub start_time: DateTime<Utc>,

    #[serde_as(as = "bson::serde_helpers::datetime::FromChrono04DateTime")]
    pub end_time: DateTime<Utc>,

    #[serde(rename = "durationMillis")]
    pub duration_millis: i64,

    pub start_voltage: Volts,
    pub end_voltage: Volts,
    pub voltage_drop: Volts,

    #[serde(rename = "energyConsumedMilliwattHours")]
    pub energy_consumed: MilliwattHours,
}

impl Record for PowerCut {
    const COLLECTION_NAME: &str = "powerCutEvents";
}

impl From<&PowerCutEvent> for PowerCut {
    fn from(event: &PowerCutEvent) -> Self {
        Self {
            device_id: event.device_id.clone(),
            start_time: event.start_time,
            end_time: event.end_time,
            duration_millis: event.duration.num_milliseconds(),
            start_voltage: event.start_voltage,
            end_voltage: event.end_voltage,
            voltage_drop: event.voltage_drop,
            energy_consumed: event.energy_consumed,
        }
    }
}

impl TryFrom<PowerCut> for PowerCutEvent {
    type Error = Error;

    fn try_from(power_cut: PowerCut) -> Result<Self> {
        let duration = TimeDelta::try_milliseconds(power_cut.duration_millis)
            .with_context(|| format!("invalid duration: {} ms", power_cut.duration_millis))?;
        Ok(Self {
            device_id: power_cut.device_id,
            start_time: power_cut.start_time,
            end_time: power_cut.end_time,
            duration,
            start_voltage: power_cut.start_voltage,
            end_voltage: power_cut.end_voltage,
            voltage_drop: power_cut.voltage_drop,
            energy_consumed: power_cut.energy_consumed,
        })
    }
}
