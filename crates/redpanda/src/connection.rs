//! Broker connection setup shared by the consumer, producer and health checks.
//!
//! rskafka retries connection errors indefinitely, so every connect here is
//! bounded by `connect_timeout_secs` and surfaces as `Error::Upstream`.

use crate::config::RedpandaConfig;
use enricher_core::{Error, Result};
use rskafka::client::{
    partition::{PartitionClient, UnknownTopicHandling},
    Client, ClientBuilder, Credentials, SaslConfig,
};
use std::future::Future;
use std::sync::Arc;

/// Creates a TLS configuration for Redpanda Cloud.
fn create_tls_config() -> Arc<rustls::ClientConfig> {
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Arc::new(config)
}

/// Runs a broker operation under the configured connect deadline.
pub(crate) async fn with_deadline<T, F>(config: &RedpandaConfig, what: &str, op: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let deadline = config.connect_timeout();
    match tokio::time::timeout(deadline, op).await {
        Ok(result) => result,
        Err(_) => Err(Error::upstream(format!(
            "{} timed out after {:?} (brokers: {})",
            what,
            deadline,
            config.broker_string()
        ))),
    }
}

/// Connects to the cluster, with TLS + SCRAM when credentials are set.
pub async fn build_client(config: &RedpandaConfig) -> Result<Client> {
    let mut builder = ClientBuilder::new(config.brokers.clone());

    if let (Some(username), Some(password)) = (&config.sasl_username, &config.sasl_password) {
        builder = builder
            .tls_config(create_tls_config())
            .sasl_config(SaslConfig::ScramSha256(Credentials::new(
                username.clone(),
                password.clone(),
            )));
    }

    with_deadline(config, "Connecting to Redpanda", async {
        builder
            .build()
            .await
            .map_err(|e| Error::upstream(format!("Failed to connect to Redpanda: {}", e)))
    })
    .await
}

/// Connects and opens the configured topic partition.
pub async fn partition_client(config: &RedpandaConfig) -> Result<Arc<PartitionClient>> {
    let client = build_client(config).await?;

    let partition_client = with_deadline(config, "Opening partition", async {
        client
            .partition_client(
                config.topic.clone(),
                config.partition,
                UnknownTopicHandling::Retry,
            )
            .await
            .map_err(|e| Error::upstream(format!("Failed to get partition client: {}", e)))
    })
    .await?;

    Ok(Arc::new(partition_client))
}
