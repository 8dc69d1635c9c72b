use std::pin::pin;

use bon::Builder;
use tokio::{select, sync::mpsc};

use crate::{
    core::{assembler::Assembler, power_cut::derive},
    prelude::*,
    store::{CommandSink, EventStore, ReadingSink},
    telemetry::{Delivery, Message, TopicMap, decode},
};

/// Decodes the deliveries, assembles readings, and persists everything worth keeping.
///
/// Store failures are logged and skipped: nothing is retried, and nothing stops the loop.
#[derive(Builder)]
pub struct Ingestion<S> {
    topics: TopicMap,
    store: S,

    #[builder(default)]
    assembler: Assembler,
}

impl<S: ReadingSink + EventStore + CommandSink> Ingestion<S> {
    /// Handle deliveries until the transport goes away or the shutdown is requested.
    ///
    /// Half-assembled readings are not flushed.
    pub async fn run(
        mut self,
        mut deliveries: mpsc::Receiver<Delivery>,
        shutdown: impl Future<Output = ()>,
    ) {
        let mut shutdown = pin!(shutdown);
        info!("ingesting…");
        loop {
            select! {
                () = &mut shutdown => {
                    info!("shutting down…");
                    break;
                }
                delivery = deliveries.recv() => {
                    let Some(delivery) = delivery else {
                        warn!("the transport has stopped");
                        break;
                    };
                    self.handle(&delivery).await;
                }
            }
        }
    }

    #[instrument(skip_all, fields(topic = %delivery.topic))]
    pub async fn handle(&mut self, delivery: &Delivery) {
        let message = match decode(&self.topics, delivery) {
            Ok(Some(message)) => message,
            Ok(None) => {
                trace!("not ours");
                return;
            }
            Err(error) => {
                warn!("dropping the delivery: {error:#}");
                return;
            }
        };

        match message {
            Message::Field(update) => {
                if let Some(reading) = self.assembler.apply(update) {
                    debug!(device_id = %reading.device_id, "storing the reading…");
                    if let Err(error) = self.store.insert_reading(&reading).await {
                        error!(device_id = %reading.device_id, "{error:#}");
                    }
                }
            }
            Message::PowerCut(payload) => match derive(&payload) {
                Ok(event) => {
                    info!(
                        device_id = %event.device_id,
                        start_time = %event.start_time,
                        duration = ?event.duration,
                        "power cut reported",
                    );
                    if let Err(error) = self.store.insert_event(&event).await {
                        error!(device_id = %event.device_id, "{error:#}");
                    }
                }
                Err(error) => {
                    warn!(device_id = %payload.device_id, "dropping the power cut: {error:#}");
                }
            },
            Message::Command(command) => {
                if command.is_clear_log() {
                    debug!(device_id = %command.device_id, "not storing the log wipe");
                } else if let Err(error) = self.store.insert_command(&command).await {
                    error!(device_id = %command.device_id, "{error:#}");
                }
            }
        }
    }
}
