//! Record producer using rskafka.

use crate::config::RedpandaConfig;
use crate::connection::partition_client;
use async_trait::async_trait;
use chrono::Utc;
use enricher_core::{Error, RawRecord, Result};
use rskafka::client::partition::{Compression, PartitionClient};
use rskafka::record::Record;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error};

/// Publishes raw name records.
#[async_trait]
pub trait RecordPublisher: Send + Sync {
    /// Publishes one record under `key`, returning its offset.
    async fn publish(&self, key: &str, record: &RawRecord) -> Result<i64>;
}

/// Producer writing JSON-encoded records to the configured topic.
pub struct Producer {
    config: RedpandaConfig,
    client: RwLock<Option<Arc<PartitionClient>>>,
}

impl Producer {
    pub fn new(config: RedpandaConfig) -> Self {
        Self {
            config,
            client: RwLock::new(None),
        }
    }

    async fn get_client(&self) -> Result<Arc<PartitionClient>> {
        {
            let client = self.client.read().await;
            if let Some(ref c) = *client {
                return Ok(c.clone());
            }
        }

        let client = partition_client(&self.config).await?;
        *self.client.write().await = Some(client.clone());
        Ok(client)
    }

    fn compression(&self) -> Compression {
        match self.config.compression.as_str() {
            "gzip" => Compression::Gzip,
            "snappy" => Compression::Snappy,
            "lz4" => Compression::Lz4,
            "zstd" => Compression::Zstd,
            _ => Compression::NoCompression,
        }
    }
}

/// Builds the wire record for a raw record.
pub fn to_record(key: &str, record: &RawRecord) -> Result<Record> {
    Ok(Record {
        key: Some(key.as_bytes().to_vec()),
        value: Some(record.to_payload()?),
        headers: BTreeMap::new(),
        timestamp: Utc::now(),
    })
}

#[async_trait]
impl RecordPublisher for Producer {
    async fn publish(&self, key: &str, record: &RawRecord) -> Result<i64> {
        let client = self.get_client().await?;
        let wire = to_record(key, record)?;

        let offsets = client
            .produce(vec![wire], self.compression())
            .await
            .map_err(|e| {
                error!(topic = %self.config.topic, key = %key, error = %e, "Failed to publish record");
                Error::transport(format!("Failed to produce: {}", e))
            })?;

        let offset = offsets
            .first()
            .copied()
            .ok_or_else(|| Error::internal("Broker returned no offset"))?;

        debug!(topic = %self.config.topic, key = %key, offset = offset, "Published record");
        Ok(offset)
    }
}
