use std::{fs, path::PathBuf, pin::pin};

use clap::{Parser, Subcommand};
use tokio::select;

use crate::{
    cache::JsonFileCache,
    cli::{db::DbArgs, mqtt::MqttArgs},
    core::{history::History, interval::Interval, power_cut::derive},
    prelude::*,
    signal::shutdown_signal,
    tables::{build_history_table, build_summary_table},
    telemetry::{Message, decode},
};

#[derive(Parser)]
pub struct HistoryArgs {
    #[clap(
        long = "cache-path",
        env = "HISTORY_CACHE_PATH",
        default_value = "power-cut-history.json"
    )]
    cache_path: PathBuf,

    #[command(subcommand)]
    command: HistoryCommand,
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// Print the merged history and its summary.
    #[clap(name = "show")]
    Show(Box<QueryArgs>),

    /// Export the merged history as CSV.
    #[clap(name = "export")]
    Export(Box<ExportArgs>),

    /// Forget the locally cached events. The database is left intact.
    #[clap(name = "clear")]
    Clear,

    /// Listen for power-cut reports and cache them locally.
    #[clap(name = "import")]
    Import(Box<ImportArgs>),
}

#[derive(Parser)]
struct QueryArgs {
    #[clap(flatten)]
    db: DbArgs,

    /// Only load the power cuts that started within this period.
    #[clap(long, env = "HISTORY_SINCE", default_value = "30days")]
    since: humantime::Duration,

    /// Maximum number of the power cuts to load from the database.
    #[clap(long, env = "HISTORY_LIMIT", default_value = "100")]
    limit: u32,
}

impl QueryArgs {
    async fn load(&self, cache: JsonFileCache) -> Result<History<JsonFileCache>> {
        let interval = Interval::try_since(self.since.into())?;
        let db = self.db.connect().await?;
        let history = History::load(&db, cache, interval, self.limit).await;
        db.shutdown().await;
        Ok(history)
    }
}

#[derive(Parser)]
struct ExportArgs {
    #[clap(flatten)]
    query: QueryArgs,

    /// Write into the file instead of the standard output.
    #[clap(long, short)]
    output: Option<PathBuf>,
}

#[derive(Parser)]
struct ImportArgs {
    #[clap(flatten)]
    query: QueryArgs,

    #[clap(flatten)]
    mqtt: MqttArgs,
}

impl HistoryArgs {
    pub async fn run(self) -> Result {
        let cache = JsonFileCache::new(self.cache_path);
        match self.command {
            HistoryCommand::Show(args) => {
                let history = args.load(cache).await?;
                println!("{}", build_history_table(history.events()));
                println!("{}", build_summary_table(&history.summary(), history.is_degraded()));
            }
            HistoryCommand::Export(args) => {
                let history = args.query.load(cache).await?;
                let text = history.to_delimited_text();
                match args.output {
                    Some(path) => {
                        fs::write(&path, text)
                            .with_context(|| format!("failed to write `{}`", path.display()))?;
                        let n_events = history.events().len();
                        info!(path = %path.display(), n_events, "exported");
                    }
                    None => print!("{text}"),
                }
            }
            HistoryCommand::Clear => {
                History::local(cache).clear()?;
            }
            HistoryCommand::Import(args) => {
                import(args.query.load(cache).await?, &args.mqtt).await;
            }
        }
        Ok(())
    }
}

/// Append every reported power cut to the local history until interrupted.
#[instrument(skip_all)]
async fn import(mut history: History<JsonFileCache>, mqtt: &MqttArgs) {
    let topics = mqtt.topics();
    let mut deliveries = mqtt.subscribe();
    let mut shutdown = pin!(shutdown_signal());
    info!(n_events = history.events().len(), "listening for power cuts…");
    loop {
        let delivery = select! {
            () = &mut shutdown => break,
            delivery = deliveries.recv() => delivery,
        };
        let Some(delivery) = delivery else {
            warn!("the transport has stopped");
            break;
        };
        let payload = match decode(&topics, &delivery) {
            Ok(Some(Message::PowerCut(payload))) => payload,
            Ok(_) => continue,
            Err(error) => {
                warn!("dropping the delivery: {error:#}");
                continue;
            }
        };
        let event = match derive(&payload) {
            Ok(event) => event,
            Err(error) => {
                warn!(device_id = %payload.device_id, "dropping the power cut: {error:#}");
                continue;
            }
        };
        info!(device_id = %event.device_id, start_time = %event.start_time, "power cut reported");
        if let Err(error) = history.append(event) {
            error!("{error:#}");
        }
    }
    println!("{}", build_history_table(history.events()));
}
