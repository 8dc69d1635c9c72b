use std::str::from_utf8;

use chrono::{DateTime, Utc};

use crate::{
    error::DecodeError,
    telemetry::{Delivery, DeviceId, Field, FieldUpdate, Status, Subject, TopicMap},
};

/// Decoded delivery.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    Field(FieldUpdate),
    PowerCut(EventPayload),
    Command(CommandMessage),
}

/// Opaque power-cut payload, handed to [`crate::core::power_cut::derive`] as is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventPayload {
    pub device_id: DeviceId,
    pub body: Vec<u8>,
    pub arrival_time: DateTime<Utc>,
}

/// Free-form device status message, such as `✓ Power Restored.`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandMessage {
    pub device_id: DeviceId,
    pub topic: String,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl CommandMessage {
    /// Sentinel the firmware sends to wipe the command log.
    pub const CLEAR_LOG: &'static str = "CLEAR_LOG";

    #[must_use]
    pub fn is_clear_log(&self) -> bool {
        self.text == Self::CLEAR_LOG
    }
}

/// Decode the delivery.
///
/// Deliveries on topics outside the configured prefixes decode into `Ok(None)`.
pub fn decode(topics: &TopicMap, delivery: &Delivery) -> Result<Option<Message>, DecodeError> {
    let Some((device_id, suffix)) = topics.resolve(&delivery.topic) else {
        return Ok(None);
    };
    let device_id = device_id.clone();

    let Some(subject) = Subject::from_suffix(suffix) else {
        return Ok(Some(Message::Field(FieldUpdate {
            device_id,
            field: Field::Unrecognized(suffix.to_owned()),
            observed_at: delivery.arrival_time,
        })));
    };

    let field = match subject {
        Subject::PowerCutHistory => {
            return Ok(Some(Message::PowerCut(EventPayload {
                device_id,
                body: delivery.payload.clone(),
                arrival_time: delivery.arrival_time,
            })));
        }
        Subject::CommandStatus => {
            return Ok(Some(Message::Command(CommandMessage {
                device_id,
                topic: delivery.topic.clone(),
                text: text(delivery)?.to_owned(),
                received_at: delivery.arrival_time,
            })));
        }
        Subject::BatteryVoltage => Field::BatteryVoltage(number(delivery)?.into()),
        Subject::BatteryCurrent => Field::BatteryCurrent(number(delivery)?.into()),
        Subject::MainVoltage => Field::MainVoltage(number(delivery)?.into()),
        Subject::MainCurrent => Field::MainCurrent(number(delivery)?.into()),
        Subject::LightIntensity => Field::LightIntensity(number(delivery)?.into()),
        Subject::LedStatus => Field::LedStatus(status(delivery)?),
        Subject::Led2Status => Field::Led2Status(status(delivery)?),
        Subject::Led4Status => Field::Led4Status(status(delivery)?),
        Subject::EmergencyStatus => Field::EmergencyStatus(status(delivery)?),
        Subject::PowerCutStatus => Field::PowerCutStatus(status(delivery)?),
    };
    Ok(Some(Message::Field(FieldUpdate { device_id, field, observed_at: delivery.arrival_time })))
}

fn text(delivery: &Delivery) -> Result<&str, DecodeError> {
    from_utf8(&delivery.payload)
        .map(str::trim)
        .map_err(|source| DecodeError::NotUtf8 { topic: delivery.topic.clone(), source })
}

fn number(delivery: &Delivery) -> Result<f64, DecodeError> {
    let text = text(delivery)?;
    let value: f64 = text.parse().map_err(|source| DecodeError::NotNumber {
        topic: delivery.topic.clone(),
        payload: text.to_owned(),
        source,
    })?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DecodeError::NotFinite { topic: delivery.topic.clone(), payload: text.to_owned() })
    }
}

fn status(delivery: &Delivery) -> Result<Status, DecodeError> {
    let text = text(delivery)?;
    text.parse().map_err(|_| DecodeError::UnknownStatus {
        topic: delivery.topic.clone(),
        payload: text.to_owned(),
    })
}
