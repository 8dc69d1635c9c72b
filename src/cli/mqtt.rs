use std::{process, time::Duration};

use clap::Parser;
use rumqttc::MqttOptions;
use tokio::sync::mpsc;

use crate::{
    mqtt,
    telemetry::{Delivery, DeviceBinding, TopicMap},
};

#[derive(Parser)]
pub struct MqttArgs {
    #[clap(long = "mqtt-host", env = "MQTT_HOST", default_value = "broker.hivemq.com")]
    host: String,

    #[clap(long = "mqtt-port", env = "MQTT_PORT", default_value = "1883")]
    port: u16,

    /// Defaults to `blackout-<pid>`.
    #[clap(long = "mqtt-client-id", env = "MQTT_CLIENT_ID")]
    client_id: Option<String>,

    #[clap(long = "mqtt-retry-delay", env = "MQTT_RETRY_DELAY", default_value = "5s")]
    retry_delay: humantime::Duration,

    /// Device ID and its topic prefix.
    #[clap(
        long = "device",
        env = "DEVICES",
        value_delimiter = ',',
        default_value = "ESP32_001=esp32"
    )]
    devices: Vec<DeviceBinding>,
}

impl MqttArgs {
    pub fn topics(&self) -> TopicMap {
        TopicMap::new(self.devices.clone())
    }

    fn options(&self) -> MqttOptions {
        let client_id =
            self.client_id.clone().unwrap_or_else(|| format!("blackout-{}", process::id()));
        let mut options = MqttOptions::new(client_id, &self.host, self.port);
        options.set_keep_alive(Duration::from_secs(30));
        options.set_clean_session(true);
        options
    }

    /// Subscribe to every known topic of every configured device.
    pub fn subscribe(&self) -> mpsc::Receiver<Delivery> {
        mqtt::subscribe(self.options(), self.topics().subscriptions(), self.retry_delay.into())
    }
}
