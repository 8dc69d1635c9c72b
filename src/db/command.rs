use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::{db::Record, telemetry::{CommandMessage, DeviceId}};

/// Device command or status message, as logged for later auditing.
#[serde_as]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCommand {
    pub device_id: DeviceId,

    #[serde_as(as = "bson::serde_helpers::datetime::FromChrono04DateTime")]
    pub timestamp: DateTime<Utc>,

    /// Upper-cased last topic segment, for example: `STATUS`.
    pub command_type: String,

    /// Message prefix, at most [`StoredCommand::MAX_VALUE_LENGTH`] characters.
    pub command_value: String,

    pub topic: String,
    pub message: String,
}

impl StoredCommand {
    pub const MAX_VALUE_LENGTH: usize = 50;
}

impl Record for StoredCommand {
    const COLLECTION_NAME: &str = "commandLogs";
}

impl From<&CommandMessage> for StoredCommand {
    fn from(command: &CommandMessage) -> Self {
        Self {
            device_id: command.device_id.clone(),
            timestamp: command.received_at,
            command_type: command.topic.rsplit('/').next().unwrap_or_default().to_uppercase(),
            command_value: command.text.chars().take(Self::MAX_VALUE_LENGTH).collect(),
            topic: command.topic.clone(),
            message: command.text.clone(),
        }
    }
}
