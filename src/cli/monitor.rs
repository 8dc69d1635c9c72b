use clap::Parser;

use crate::{
    cli::mqtt::MqttArgs,
    core::{chart::VoltageChart, command_log::CommandLog},
    monitor::Monitor,
    prelude::*,
    signal::shutdown_signal,
    tables::{build_command_log_table, build_voltage_table},
};

#[derive(Parser)]
pub struct MonitorArgs {
    #[clap(flatten)]
    mqtt: MqttArgs,

    /// Number of samples in the voltage windows.
    #[clap(long, env = "CHART_CAPACITY", default_value = "60")]
    chart_capacity: usize,

    /// Number of retained command log entries.
    #[clap(long, env = "COMMAND_LOG_CAPACITY", default_value = "50")]
    command_log_capacity: usize,
}

impl MonitorArgs {
    pub async fn run(self) -> Result {
        let monitor = Monitor::builder()
            .topics(self.mqtt.topics())
            .chart(VoltageChart::with_capacity(self.chart_capacity))
            .command_log(CommandLog::with_capacity(self.command_log_capacity))
            .build()
            .run(self.mqtt.subscribe(), shutdown_signal())
            .await;
        if !monitor.chart().battery.is_empty() {
            println!("{}", build_voltage_table(monitor.chart()));
        }
        if !monitor.command_log().is_empty() {
            println!("{}", build_command_log_table(monitor.command_log().iter()));
        }
        Ok(())
    }
}
