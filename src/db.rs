pub mod command;
pub mod power_cut;
pub mod reading;

use std::fmt::Debug;

use bson::doc;
use futures_util::TryStreamExt;
use mongodb::{
    Client,
    Collection,
    Database,
    IndexModel,
    error::{ErrorKind, WriteFailure},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    core::{interval::Interval, power_cut::PowerCutEvent, reading::CompositeReading},
    db::{command::StoredCommand, power_cut::PowerCut, reading::SensorReading},
    error::{StoreReadError, StoreWriteError},
    prelude::*,
    store::{CommandSink, EventStore, ReadingSink},
    telemetry::CommandMessage,
};

/// Anything that gets stored in its own collection.
pub trait Record: Send + Sync + Serialize + DeserializeOwned {
    const COLLECTION_NAME: &str;
}

#[must_use]
#[derive(Clone)]
pub struct Db(Database);

impl Db {
    /// Connect to the database with the specified URI.
    ///
    /// The URI *must* specify the database name.
    #[instrument(skip_all)]
    pub async fn with_uri(uri: impl AsRef<str> + Debug) -> Result<Self> {
        let inner = Client::with_uri_str(uri)
            .await?
            .default_database()
            .context("MongoDB URI does not define the default database")?;
        Ok(Self(inner))
    }

    /// Create the indexes, unless they already exist.
    #[instrument(skip_all)]
    pub async fn initialize(&self) -> Result {
        info!("initializing…");
        self.collection::<PowerCut>()
            .create_index(IndexModel::builder().keys(doc! { "startTime": -1 }).build())
            .await
            .context("failed to create the power cut index")?;
        Ok(())
    }

    pub async fn shutdown(self) {
        self.0.client().clone().shutdown().await;
    }

    fn collection<R: Record>(&self) -> Collection<R> {
        self.0.collection::<R>(R::COLLECTION_NAME)
    }

    #[instrument(skip_all, fields(collection_name = R::COLLECTION_NAME))]
    async fn insert<R: Record>(&self, record: &R) -> Result<(), mongodb::error::Error> {
        debug!("inserting…");
        self.collection::<R>().insert_one(record).await?;
        Ok(())
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(error)) if error.code == 11000,
    )
}

impl ReadingSink for Db {
    async fn insert_reading(&self, reading: &CompositeReading) -> Result<(), StoreWriteError> {
        match self.insert(&SensorReading::from(reading)).await {
            Ok(()) => Ok(()),
            Err(error) if is_duplicate_key(&error) => {
                debug!(device_id = %reading.device_id, "the reading is already stored");
                Ok(())
            }
            Err(error) => Err(StoreWriteError(error.into())),
        }
    }
}

impl EventStore for Db {
    async fn insert_event(&self, event: &PowerCutEvent) -> Result<(), StoreWriteError> {
        self.insert(&PowerCut::from(event)).await.map_err(|error| StoreWriteError(error.into()))
    }

    #[instrument(skip_all, fields(?interval, limit = limit))]
    async fn query_events(
        &self,
        interval: Interval,
        limit: u32,
    ) -> Result<Vec<PowerCutEvent>, StoreReadError> {
        info!("querying power cuts…");
        let query = async {
            self.collection::<PowerCut>()
                .find(doc! { "startTime": { "$gte": interval.start, "$lt": interval.end } })
                .sort(doc! { "startTime": -1 })
                .limit(i64::from(limit))
                .await
                .context("failed to query the power cuts")?
                .map_err(Error::from)
                .and_then(|document| async move { PowerCutEvent::try_from(document) })
                .try_collect::<Vec<_>>()
                .await
        };
        query.await.map_err(StoreReadError)
    }
}

impl CommandSink for Db {
    async fn insert_command(&self, command: &CommandMessage) -> Result<(), StoreWriteError> {
        self.insert(&StoredCommand::from(command))
            .await
            .map_err(|error| StoreWriteError(error.into()))
    }
}
