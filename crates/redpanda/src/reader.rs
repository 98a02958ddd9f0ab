//! Partition reads behind a trait, so the consumer's recovery logic does not
//! depend on a live broker.

use crate::config::{RedpandaConfig, StartOffset};
use crate::connection::{partition_client, with_deadline};
use crate::source::Message;
use async_trait::async_trait;
use enricher_core::{Error, Result};
use rskafka::client::error::{Error as ClientError, ProtocolError};
use rskafka::client::partition::{OffsetAt, PartitionClient};
use std::fmt;
use std::sync::Arc;

/// Why a fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The requested offset is outside the retained range.
    OffsetOutOfRange,
    /// Anything else: connection loss, leader change, timeout.
    Failed(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OffsetOutOfRange => write!(f, "offset out of range"),
            Self::Failed(msg) => write!(f, "{}", msg),
        }
    }
}

/// Records returned by one fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchedBatch {
    pub messages: Vec<Message>,
    pub high_watermark: i64,
}

/// Reads one topic partition.
#[async_trait]
pub trait PartitionReader: Send + Sync {
    /// Resolves a start position to a concrete offset.
    async fn offset_at(&self, at: StartOffset) -> Result<i64>;

    /// Fetches records from `offset` on. May return records before `offset`
    /// when they share a compressed batch.
    async fn fetch(&self, offset: i64) -> std::result::Result<FetchedBatch, FetchError>;
}

/// Opens partition readers; called again after every failed fetch.
#[async_trait]
pub trait PartitionConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn PartitionReader>>;
}

/// Connector for a real cluster.
pub struct RskafkaConnector {
    config: RedpandaConfig,
}

impl RskafkaConnector {
    pub fn new(config: RedpandaConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PartitionConnector for RskafkaConnector {
    async fn connect(&self) -> Result<Arc<dyn PartitionReader>> {
        let client = partition_client(&self.config).await?;
        Ok(Arc::new(RskafkaReader {
            client,
            config: self.config.clone(),
        }))
    }
}

struct RskafkaReader {
    client: Arc<PartitionClient>,
    config: RedpandaConfig,
}

#[async_trait]
impl PartitionReader for RskafkaReader {
    async fn offset_at(&self, at: StartOffset) -> Result<i64> {
        let at = match at {
            StartOffset::Earliest => OffsetAt::Earliest,
            StartOffset::Latest => OffsetAt::Latest,
        };
        with_deadline(&self.config, "Resolving start offset", async {
            self.client
                .get_offset(at)
                .await
                .map_err(|e| Error::upstream(format!("Failed to get offset: {}", e)))
        })
        .await
    }

    async fn fetch(&self, offset: i64) -> std::result::Result<FetchedBatch, FetchError> {
        let fetched = tokio::time::timeout(
            self.config.fetch_timeout(),
            self.client.fetch_records(
                offset,
                1..self.config.fetch_max_bytes,
                self.config.fetch_wait_ms,
            ),
        )
        .await
        .map_err(|_| {
            FetchError::Failed(format!(
                "fetch timed out after {:?}",
                self.config.fetch_timeout()
            ))
        })?;

        let (records, high_watermark) = fetched.map_err(|e| match e {
            ClientError::ServerError {
                protocol_error: ProtocolError::OffsetOutOfRange,
                ..
            } => FetchError::OffsetOutOfRange,
            other => FetchError::Failed(other.to_string()),
        })?;

        let messages = records
            .into_iter()
            .map(|r| Message {
                partition: self.config.partition,
                offset: r.offset,
                key: r.record.key,
                value: r.record.value,
            })
            .collect();

        Ok(FetchedBatch {
            messages,
            high_watermark,
        })
    }
}
