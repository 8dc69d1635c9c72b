mod db;
mod history;
mod ingest;
mod monitor;
mod mqtt;

use clap::{Parser, Subcommand};

use crate::cli::{
    history::HistoryArgs,
    ingest::IngestArgs,
    monitor::MonitorArgs,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store the sensor readings, power cuts, and device messages until interrupted.
    #[clap(name = "ingest")]
    Ingest(Box<IngestArgs>),

    /// Watch the voltages and device messages live.
    #[clap(name = "monitor")]
    Monitor(Box<MonitorArgs>),

    /// Power-cut history.
    #[clap(name = "history")]
    History(Box<HistoryArgs>),
}
