use clap::Parser;

use crate::{
    cli::{db::DbArgs, mqtt::MqttArgs},
    ingest::Ingestion,
    prelude::*,
    signal::shutdown_signal,
};

#[derive(Parser)]
pub struct IngestArgs {
    #[clap(flatten)]
    db: DbArgs,

    #[clap(flatten)]
    mqtt: MqttArgs,
}

impl IngestArgs {
    pub async fn run(self) -> Result {
        let db = self.db.connect().await?;
        db.initialize().await?;
        let deliveries = self.mqtt.subscribe();
        Ingestion::builder()
            .topics(self.mqtt.topics())
            .store(db.clone())
            .build()
            .run(deliveries, shutdown_signal())
            .await;
        db.shutdown().await;
        Ok(())
    }
}
