//! Publishes one name record to the configured topic.
//!
//! Uses the same configuration layers as the pipeline, so brokers and topic
//! come from `config/default.toml` and `ENRICHER_*` variables.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use enricher_core::RawRecord;
use name_enricher::load_settings;
use redpanda::{Producer, RecordPublisher};
use telemetry::init_tracing_from_env;

#[derive(Parser, Debug)]
#[command(name = "publish-record", version, about = "Publish a name record to Redpanda")]
struct Args {
    #[arg(long)]
    name: String,

    #[arg(long)]
    surname: String,

    #[arg(long)]
    patronymic: String,

    /// Message key
    #[arg(long, default_value = "Key-1")]
    key: String,

    /// Overrides the configured topic
    #[arg(long, env = "ENRICHER_REDPANDA_TOPIC")]
    topic: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();
    init_tracing_from_env();

    let args = Args::parse();
    let mut settings = load_settings()?;
    if let Some(topic) = args.topic {
        settings.redpanda.topic = topic;
    }

    let topic = settings.redpanda.topic.clone();
    let producer = Producer::new(settings.redpanda);
    let record = RawRecord::new(args.name, args.surname, args.patronymic);

    let offset = producer
        .publish(&args.key, &record)
        .await
        .with_context(|| format!("Failed to publish record to {}", topic))?;

    info!(
        topic = %topic,
        key = %args.key,
        offset = offset,
        name = %record.name,
        "Record published"
    );
    Ok(())
}
