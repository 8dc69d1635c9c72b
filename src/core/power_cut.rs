use bon::Builder;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};

use crate::{
    error::DecodeError,
    quantity::{energy::MilliwattHours, voltage::Volts},
    telemetry::{DeviceId, EventPayload},
};

/// Completed power outage as reported by the device once the mains came back.
///
/// Two events are the same event only if every field matches.
#[serde_as]
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Builder)]
pub struct PowerCutEvent {
    #[builder(into)]
    pub device_id: DeviceId,

    pub start_time: DateTime<Utc>,

    /// Arrival time of the report.
    pub end_time: DateTime<Utc>,

    #[serde(rename = "duration_ms")]
    #[serde_as(as = "DurationMilliSeconds<i64>")]
    pub duration: TimeDelta,

    pub start_voltage: Volts,
    pub end_voltage: Volts,
    pub voltage_drop: Volts,
    pub energy_consumed: MilliwattHours,
}

impl PowerCutEvent {
    #[must_use]
    pub fn duration_minutes(&self) -> f64 {
        self.duration.as_seconds_f64() / 60.0
    }
}

/// Power-cut report as published by the firmware.
#[derive(Deserialize)]
struct Report {
    /// Milliseconds.
    duration: u64,

    #[serde(rename = "startV")]
    start_voltage: Volts,

    #[serde(rename = "endV")]
    end_voltage: Volts,

    drop: Volts,
    energy: MilliwattHours,
}

/// Derive the event from the raw report.
///
/// The report arrives when the outage is over, hence the arrival time is the end of it.
pub fn derive(payload: &EventPayload) -> Result<PowerCutEvent, DecodeError> {
    let report: Report = serde_json::from_slice(&payload.body)?;
    let duration = i64::try_from(report.duration)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .ok_or(DecodeError::DurationOutOfRange(report.duration))?;
    let start_time = payload
        .arrival_time
        .checked_sub_signed(duration)
        .ok_or(DecodeError::DurationOutOfRange(report.duration))?;
    Ok(PowerCutEvent {
        device_id: payload.device_id.clone(),
        start_time,
        end_time: payload.arrival_time,
        duration,
        start_voltage: report.start_voltage,
        end_voltage: report.end_voltage,
        voltage_drop: report.drop,
        energy_consumed: report.energy,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn payload(body: &str) -> EventPayload {
        EventPayload {
            device_id: "ESP32_001".into(),
            body: body.as_bytes().to_vec(),
            arrival_time: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        }
    }

    #[test]
    fn derive_ok() {
        let payload = payload(
            r#"{"duration":5000,"startV":12.6,"endV":12.1,"drop":0.5,"energy":3.2,"extra":1}"#,
        );
        let event = derive(&payload).unwrap();
        assert_eq!(event.end_time, payload.arrival_time);
        assert_eq!(event.start_time, payload.arrival_time - TimeDelta::milliseconds(5000));
        assert_eq!(event.duration, TimeDelta::milliseconds(5000));
        assert_eq!(event.start_voltage, Volts(12.6));
        assert_eq!(event.end_voltage, Volts(12.1));
        assert_eq!(event.voltage_drop, Volts(0.5));
        assert_eq!(event.energy_consumed, MilliwattHours(3.2));
        assert_eq!(event.device_id, "ESP32_001".into());
    }

    #[test]
    fn missing_field() {
        let payload = payload(r#"{"duration":5000,"startV":12.6,"endV":12.1,"drop":0.5}"#);
        assert!(matches!(derive(&payload), Err(DecodeError::PowerCut(_))));
    }

    #[test]
    fn not_json() {
        assert!(matches!(derive(&payload("power cut")), Err(DecodeError::PowerCut(_))));
    }

    #[test]
    fn negative_duration() {
        let payload = payload(r#"{"duration":-1,"startV":1,"endV":1,"drop":0,"energy":0}"#);
        assert!(matches!(derive(&payload), Err(DecodeError::PowerCut(_))));
    }

    #[test]
    fn huge_duration() {
        let payload = payload(&format!(
            r#"{{"duration":{},"startV":1,"endV":1,"drop":0,"energy":0}}"#,
            u64::MAX,
        ));
        assert!(matches!(derive(&payload), Err(DecodeError::DurationOutOfRange(_))));
    }

    #[test]
    fn serializes_duration_as_millis() {
        let event = derive(&payload(
            r#"{"duration":90000,"startV":12.6,"endV":12.1,"drop":0.5,"energy":3.2}"#,
        ))
        .unwrap();
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["duration_ms"], 90000);
        assert_eq!(serde_json::from_value::<PowerCutEvent>(value).unwrap(), event);
        assert!((event.duration_minutes() - 1.5).abs() < f64::EPSILON);
    }
}
