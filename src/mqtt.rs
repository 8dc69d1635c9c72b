use std::time::Duration;

use chrono::{SubsecRound, Utc};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, Publish, QoS, SubscribeFilter};
use tokio::{select, sync::mpsc, time::sleep};

use crate::{prelude::*, telemetry::Delivery};

const CHANNEL_CAPACITY: usize = 100;

/// Subscribe to the topics and forward every publish to the returned channel.
///
/// The connection is driven by a separate task, which stops as soon as the receiver is dropped.
/// Connection errors are logged and the broker is reconnected after the retry delay.
pub fn subscribe(
    options: MqttOptions,
    topics: impl IntoIterator<Item = String>,
    retry_delay: Duration,
) -> mpsc::Receiver<Delivery> {
    let filters: Vec<_> =
        topics.into_iter().map(|topic| SubscribeFilter::new(topic, QoS::AtLeastOnce)).collect();
    let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
    let (client, event_loop) = AsyncClient::new(options, CHANNEL_CAPACITY);
    tokio::spawn(run(client, event_loop, filters, retry_delay, sender));
    receiver
}

#[instrument(skip_all)]
async fn run(
    client: AsyncClient,
    mut event_loop: EventLoop,
    filters: Vec<SubscribeFilter>,
    retry_delay: Duration,
    sender: mpsc::Sender<Delivery>,
) {
    info!(n_topics = filters.len(), "connecting…");
    loop {
        let event = select! {
            event = event_loop.poll() => event,
            () = sender.closed() => break,
        };
        match event {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                // Clean session: subscriptions do not survive reconnects.
                info!("connected, subscribing…");
                if let Err(error) = client.subscribe_many(filters.clone()).await {
                    error!("failed to subscribe: {error:#}");
                }
            }
            Ok(Event::Incoming(Packet::SubAck(_))) => {
                debug!("subscribed");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if sender.send(into_delivery(publish)).await.is_err() {
                    break;
                }
            }
            Ok(event) => {
                trace!(?event);
            }
            Err(error) => {
                error!(?retry_delay, "connection error: {error:#}");
                sleep(retry_delay).await;
            }
        }
    }
    info!("the receiver is gone, disconnecting…");
    if let Err(error) = client.try_disconnect() {
        warn!("failed to disconnect: {error:#}");
    }
}

/// Timestamp the publish.
///
/// The arrival time is truncated to milliseconds, the precision the durable store keeps.
fn into_delivery(publish: Publish) -> Delivery {
    Delivery {
        topic: publish.topic,
        payload: publish.payload.to_vec(),
        arrival_time: Utc::now().trunc_subsecs(3),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    #[test]
    fn delivery_from_publish() {
        let publish = Publish::new("esp32/sensor/voltage", QoS::AtLeastOnce, "12.5");
        let delivery = into_delivery(publish);
        assert_eq!(delivery.topic, "esp32/sensor/voltage");
        assert_eq!(delivery.payload, b"12.5");
        assert_eq!(delivery.arrival_time.nanosecond() % 1_000_000, 0);
    }
}
