mod decode;
mod device;
mod field;
mod status;
mod topic;

use chrono::{DateTime, Utc};

pub use self::{
    decode::{CommandMessage, EventPayload, Message, decode},
    device::{DeviceBinding, DeviceId},
    field::{Field, FieldUpdate},
    status::Status,
    topic::{Subject, TopicMap},
};

/// Single publish event as handed over by the transport.
#[derive(Clone, Debug)]
pub struct Delivery {
    pub topic: String,
    pub payload: Vec<u8>,
    pub arrival_time: DateTime<Utc>,
}
