//! Persistence seams.

use crate::{
    core::{interval::Interval, power_cut::PowerCutEvent, reading::CompositeReading},
    error::{StoreReadError, StoreWriteError},
    prelude::*,
    telemetry::CommandMessage,
};

pub trait ReadingSink {
    /// Persist the snapshot.
    ///
    /// A snapshot with the same device and timestamp being already stored is not an error.
    async fn insert_reading(&self, reading: &CompositeReading) -> Result<(), StoreWriteError>;
}

pub trait EventStore {
    async fn insert_event(&self, event: &PowerCutEvent) -> Result<(), StoreWriteError>;

    /// Query the events that started within the interval, newest first.
    async fn query_events(
        &self,
        interval: Interval,
        limit: u32,
    ) -> Result<Vec<PowerCutEvent>, StoreReadError>;
}

pub trait CommandSink {
    async fn insert_command(&self, command: &CommandMessage) -> Result<(), StoreWriteError>;
}

/// Single list-valued slot on the local machine.
pub trait LocalCache {
    fn load(&self) -> Result<Vec<PowerCutEvent>>;

    fn store(&self, events: &[PowerCutEvent]) -> Result;
}
