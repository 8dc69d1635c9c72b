use chrono::{DateTime, Utc};

use crate::{
    quantity::{current::Milliamps, percent::Percent, power::Watts, voltage::Volts},
    telemetry::{DeviceId, Field, Status},
};

/// Composite multi-field snapshot of a device.
///
/// Used both as the long-lived per-device accumulator and as the emitted snapshot.
/// Fields start unset and are overwritten in place; stale values are carried forward.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeReading {
    pub device_id: DeviceId,
    pub observed_at: DateTime<Utc>,

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

impl CompositeReading {
    pub const fn new(device_id: DeviceId, observed_at: DateTime<Utc>) -> Self {
        Self {
            device_id,
            observed_at,
            battery_voltage: None,
            battery_current: None,
            battery_power: None,
            main_voltage: None,
            main_current: None,
            main_power: None,
            light_intensity: None,
            led_status: None,
            led2_status: None,
            led4_status: None,
            emergency_status: None,
            power_cut_status: None,
        }
    }

    /// Overwrite the field and move the observation time forward.
    ///
    /// Returns `false` and leaves the reading untouched for [`Field::Unrecognized`].
    pub fn apply(&mut self, field: Field, observed_at: DateTime<Utc>) -> bool {
        match field {
            Field::BatteryVoltage(voltage) => {
                self.battery_voltage = Some(voltage);
                self.battery_power = power(self.battery_voltage, self.battery_current);
            }
            Field::BatteryCurrent(current) => {
                self.battery_current = Some(current);
                self.battery_power = power(self.battery_voltage, self.battery_current);
            }
            Field::MainVoltage(voltage) => {
                self.main_voltage = Some(voltage);
                self.main_power = power(self.main_voltage, self.main_current);
            }
            Field::MainCurrent(current) => {
                self.main_current = Some(current);
                self.main_power = power(self.main_voltage, self.main_current);
            }
            Field::LightIntensity(intensity) => self.light_intensity = Some(intensity),
            Field::LedStatus(status) => self.led_status = Some(status),
            Field::Led2Status(status) => self.led2_status = Some(status),
            Field::Led4Status(status) => self.led4_status = Some(status),
            Field::EmergencyStatus(status) => self.emergency_status = Some(status),
            Field::PowerCutStatus(status) => self.power_cut_status = Some(status),
            Field::Unrecognized(_) => return false,
        }
        self.observed_at = observed_at;
        true
    }

    /// Both primary voltages are known, the reading may be persisted.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.battery_voltage.is_some() && self.main_voltage.is_some()
    }
}

fn power(voltage: Option<Volts>, current: Option<Milliamps>) -> Option<Watts> {
    Some(voltage? * current?)
}
