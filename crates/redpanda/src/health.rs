//! Redpanda health checks.

use crate::config::RedpandaConfig;
use crate::connection::{build_client, with_deadline};
use enricher_core::Error;
use tracing::{debug, error, warn};

/// Checks that the brokers answer and the configured topic exists.
///
/// Returns within roughly twice `connect_timeout_secs` when the brokers
/// are unreachable.
pub async fn check_connection(config: &RedpandaConfig) -> bool {
    let client = match build_client(config).await {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            return false;
        }
    };

    let listed = with_deadline(config, "Listing topics", async {
        client
            .list_topics()
            .await
            .map_err(|e| Error::upstream(format!("Failed to list Redpanda topics: {}", e)))
    })
    .await;

    match listed {
        Ok(topics) => {
            let found = topics.iter().any(|t| t.name == config.topic);
            if !found {
                warn!(topic = %config.topic, "Topic not found on brokers yet");
            }
            debug!(topics = topics.len(), "Redpanda connection healthy");
            true
        }
        Err(e) => {
            error!("{}", e);
            false
        }
    }
}
