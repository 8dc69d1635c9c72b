use std::pin::pin;

use bon::Builder;
use chrono::{DateTime, Local, Utc};
use tokio::{select, sync::mpsc};

use crate::{
    core::{
        chart::VoltageChart,
        command_log::{CommandLog, Kind},
        power_cut::derive,
    },
    prelude::*,
    quantity::voltage::Volts,
    telemetry::{Delivery, Field, Message, Status, TopicMap, decode},
};

/// Live view over the deliveries: voltage chart and command log.
#[must_use]
#[derive(Builder)]
pub struct Monitor {
    topics: TopicMap,

    #[builder(default)]
    chart: VoltageChart,

    #[builder(default)]
    command_log: CommandLog,

    /// Last seen power-cut status, to report the changes only.
    #[builder(skip)]
    power_cut_status: Option<Status>,
}

impl Monitor {
    /// Watch the deliveries until the transport goes away or the shutdown is requested.
    pub async fn run(
        mut self,
        mut deliveries: mpsc::Receiver<Delivery>,
        shutdown: impl Future<Output = ()>,
    ) -> Self {
        let mut shutdown = pin!(shutdown);
        info!("monitoring…");
        loop {
            select! {
                () = &mut shutdown => break,
                delivery = deliveries.recv() => {
                    let Some(delivery) = delivery else {
                        warn!("the transport has stopped");
                        break;
                    };
                    self.handle(&delivery);
                }
            }
        }
        self
    }

    #[instrument(skip_all, fields(topic = %delivery.topic))]
    pub fn handle(&mut self, delivery: &Delivery) {
        let message = match decode(&self.topics, delivery) {
            Ok(Some(message)) => message,
            Ok(None) => return,
            Err(error) => {
                warn!("dropping the delivery: {error:#}");
                self.command_log.push(delivery.arrival_time, format!("{error:#}"), Kind::Error);
                return;
            }
        };

        match message {
            Message::Field(update) => match update.field {
                Field::BatteryVoltage(voltage) => {
                    self.chart.observe_battery(voltage, &label(update.observed_at));
                    self.log_voltages();
                }
                Field::MainVoltage(voltage) => {
                    self.chart.observe_main(voltage, &label(update.observed_at));
                    self.log_voltages();
                }
                Field::PowerCutStatus(status) => {
                    self.on_power_cut_status(status, update.observed_at);
                }
                field => {
                    debug!(device_id = %update.device_id, ?field);
                }
            },
            Message::PowerCut(payload) => match derive(&payload) {
                Ok(event) => {
                    let message = format!(
                        "power cut of {:.1} min: {} → {}, {}",
                        event.duration_minutes(),
                        event.start_voltage,
                        event.end_voltage,
                        event.energy_consumed,
                    );
                    info!(device_id = %event.device_id, "{message}");
                    self.command_log.push(event.end_time, message, Kind::Warning);
                }
                Err(error) => {
                    warn!("dropping the power cut: {error:#}");
                    self.command_log.push(payload.arrival_time, format!("{error:#}"), Kind::Error);
                }
            },
            Message::Command(command) => match self.command_log.apply_device_message(&command) {
                Some(entry) => info!(device_id = %command.device_id, "{}", entry.message),
                None => info!(device_id = %command.device_id, "the command log is cleared"),
            },
        }
    }

    fn on_power_cut_status(&mut self, status: Status, at: DateTime<Utc>) {
        if self.power_cut_status.replace(status) == Some(status) {
            return;
        }
        match status {
            Status::PowerCut => {
                warn!("power cut detected");
                self.command_log.push(at, "power cut detected", Kind::Warning);
            }
            Status::Normal => {
                info!("mains power is back");
                self.command_log.push(at, "mains power is back", Kind::Success);
            }
            status => {
                debug!(%status, "unexpected power-cut status");
            }
        }
    }

    fn log_voltages(&self) {
        info!(
            battery = ?self.chart.last_battery(),
            main = ?self.chart.last_main(),
            battery_average = ?self.chart.battery.average().map(Volts),
            main_average = ?self.chart.main.average().map(Volts),
            "voltages",
        );
    }

    pub const fn chart(&self) -> &VoltageChart {
        &self.chart
    }

    pub const fn command_log(&self) -> &CommandLog {
        &self.command_log
    }
}

fn label(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::telemetry::DeviceBinding;

    fn monitor() -> Result<Monitor> {
        Ok(Monitor::builder()
            .topics(TopicMap::new(vec!["ESP32_001=esp32".parse::<DeviceBinding>()?]))
            .build())
    }

    fn delivery(topic: &str, payload: &str, seconds: i64) -> Delivery {
        Delivery {
            topic: topic.to_owned(),
            payload: payload.into(),
            arrival_time: Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap(),
        }
    }

    #[test]
    fn charts_voltages() -> Result {
        let mut monitor = monitor()?;
        monitor.handle(&delivery("esp32/sensor/voltage", "12.1", 1));
        monitor.handle(&delivery("esp32/sensor2/voltage", "12.6", 2));
        monitor.handle(&delivery("esp32/sensor/current", "100", 3));

        let chart = monitor.chart();
        assert_eq!(chart.battery.len(), 2);
        assert_eq!(chart.main.len(), 2);
        assert_eq!(chart.battery.last().unwrap().value, Some(Volts(12.1)));
        assert_eq!(chart.main.first().unwrap().value, None);
        assert_eq!(chart.last_main(), Some(Volts(12.6)));
        Ok(())
    }

    #[test]
    fn logs_power_cut_changes_once() -> Result {
        let mut monitor = monitor()?;
        monitor.handle(&delivery("esp32/powercut/status", "POWER_CUT", 1));
        monitor.handle(&delivery("esp32/powercut/status", "POWER_CUT", 2));
        monitor.handle(&delivery("esp32/powercut/status", "NORMAL", 3));

        let kinds: Vec<_> = monitor.command_log().iter().map(|entry| entry.kind).collect();
        assert_eq!(kinds, [Kind::Warning, Kind::Success]);
        Ok(())
    }

    #[test]
    fn logs_decode_errors() -> Result {
        let mut monitor = monitor()?;
        monitor.handle(&delivery("esp32/sensor/voltage", "n/a", 1));
        monitor.handle(&delivery("esp32/history/powercut", "{", 2));

        let kinds: Vec<_> = monitor.command_log().iter().map(|entry| entry.kind).collect();
        assert_eq!(kinds, [Kind::Error, Kind::Error]);
        assert!(monitor.chart().battery.is_empty());
        Ok(())
    }

    #[test]
    fn device_messages() -> Result {
        let mut monitor = monitor()?;
        monitor.handle(&delivery("esp32/command/status", "LED ON", 1));
        assert_eq!(monitor.command_log().len(), 1);
        monitor.handle(&delivery("esp32/command/status", "CLEAR_LOG", 2));
        assert!(monitor.command_log().is_empty());
        Ok(())
    }

    #[test]
    fn reports_power_cuts() -> Result {
        let mut monitor = monitor()?;
        let payload = r#"{"duration":90000,"startV":12.6,"endV":12.1,"drop":0.5,"energy":3.2}"#;
        monitor.handle(&delivery("esp32/history/powercut", payload, 1));
        let entry = monitor.command_log().iter().next().unwrap();
        assert_eq!(entry.kind, Kind::Warning);
        assert_eq!(entry.message, "power cut of 1.5 min: 12.60 V → 12.10 V, 3.20 mWh");
        Ok(())
    }
}
