use chrono::{DateTime, Utc};

use crate::{
    quantity::{current::Milliamps, percent::Percent, voltage::Volts},
    telemetry::{DeviceId, Status},
};

/// Single decoded telemetry field together with its value.
#[derive(Clone, Debug, PartialEq)]
pub enum Field {
    BatteryVoltage(Volts),
    BatteryCurrent(Milliamps),
    MainVoltage(Volts),
    MainCurrent(Milliamps),
    LightIntensity(Percent),
    LedStatus(Status),
    Led2Status(Status),
    Led4Status(Status),
    EmergencyStatus(Status),
    PowerCutStatus(Status),

    /// Published under a known device prefix but not understood by this version.
    Unrecognized(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldUpdate {
    pub device_id: DeviceId,
    pub field: Field,
    pub observed_at: DateTime<Utc>,
}
