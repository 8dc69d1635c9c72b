#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod cache;
mod cli;
mod core;
mod db;
mod error;
mod ingest;
mod monitor;
mod mqtt;
mod prelude;
mod quantity;
mod signal;
mod store;
mod tables;
mod telemetry;

use clap::{Parser, crate_version};
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Args, Command},
    prelude::*,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .without_time()
        .compact()
        .init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();

    match args.command {
        Command::Ingest(args) => args.run().await?,
        Command::Monitor(args) => args.run().await?,
        Command::History(args) => args.run().await?,
    }

    info!("done!");
    Ok(())
}
