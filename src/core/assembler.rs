use std::collections::HashMap;

use crate::{
    core::reading::CompositeReading,
    prelude::*,
    telemetry::{DeviceId, FieldUpdate},
};

/// Assembles composite readings from single-field updates.
///
/// Owns one accumulator per device. The accumulators live as long as the assembler does
/// and are never reset, so ancillary fields are carried forward between snapshots.
/// Not meant for concurrent writers: updates of a device must be applied in arrival order.
#[must_use]
#[derive(Default)]
pub struct Assembler {
    readings: HashMap<DeviceId, CompositeReading>,
}

impl Assembler {
    /// Apply the update and return a snapshot if the reading is now complete enough to persist.
    ///
    /// Unrecognized fields are dropped without touching the accumulator.
    #[instrument(skip_all, fields(device_id = %update.device_id))]
    pub fn apply(&mut self, update: FieldUpdate) -> Option<CompositeReading> {
        let FieldUpdate { device_id, field, observed_at } = update;
        let reading = self
            .readings
            .entry(device_id)
            .or_insert_with_key(|device_id| CompositeReading::new(device_id.clone(), observed_at));
        if !reading.apply(field, observed_at) {
            debug!("ignoring an unrecognized field");
            return None;
        }
        if reading.is_complete() {
            Some(reading.clone())
        } else {
            trace!(
                has_battery_voltage = reading.battery_voltage.is_some(),
                has_main_voltage = reading.main_voltage.is_some(),
                "reading is not complete yet",
            );
            None
        }
    }

    /// Current accumulator state of the device.
    #[cfg(test)]
    pub fn reading(&self, device_id: &DeviceId) -> Option<&CompositeReading> {
        self.readings.get(device_id)
    }
}
