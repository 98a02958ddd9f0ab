//! Redpanda consumer for reading name records.
//!
//! Uses rskafka for Kafka-compatible message consumption with:
//! - Committed offsets persisted per consumer group, resumed on restart
//! - Long-poll fetches buffered and handed out one message at a time
//! - Reconnect and retry on fetch errors, fatal only once retries run out

use crate::config::RedpandaConfig;
use crate::offsets::{OffsetKey, OffsetStore};
use crate::reader::{FetchError, PartitionConnector, PartitionReader, RskafkaConnector};
use crate::source::{Message, MessageSource};
use async_trait::async_trait;
use enricher_core::{Error, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use telemetry::{health, metrics};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Consumer for reading name records from Redpanda.
pub struct Consumer {
    config: RedpandaConfig,
    connector: Arc<dyn PartitionConnector>,
    offsets: Arc<dyn OffsetStore>,
    offset_key: OffsetKey,
    /// Partition reader, created lazily and dropped on fetch errors
    reader: RwLock<Option<Arc<dyn PartitionReader>>>,
    /// Fetched but not yet handed out
    buffered: Mutex<VecDeque<Message>>,
    /// Next offset to fetch
    fetch_offset: AtomicI64,
    /// Next offset after the last processed message
    committed_offset: AtomicI64,
    initialized: AtomicBool,
    closed: AtomicBool,
}

impl Consumer {
    /// Creates a consumer for the configured cluster. The connection is
    /// opened on first read.
    pub fn new(config: RedpandaConfig, offsets: Arc<dyn OffsetStore>) -> Self {
        let connector = Arc::new(RskafkaConnector::new(config.clone()));
        Self::with_connector(config, connector, offsets)
    }

    pub fn with_connector(
        config: RedpandaConfig,
        connector: Arc<dyn PartitionConnector>,
        offsets: Arc<dyn OffsetStore>,
    ) -> Self {
        info!(
            group_id = %config.group_id,
            topic = %config.topic,
            partition = config.partition,
            "Creating Redpanda consumer"
        );

        Self {
            offset_key: OffsetKey::from_config(&config),
            config,
            connector,
            offsets,
            reader: RwLock::new(None),
            buffered: Mutex::new(VecDeque::new()),
            fetch_offset: AtomicI64::new(-1),
            committed_offset: AtomicI64::new(-1),
            initialized: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// Returns a connected reader, connecting if needed. The first
    /// connection also settles the starting offset.
    async fn ensure_connected(&self) -> Result<Arc<dyn PartitionReader>> {
        {
            let reader = self.reader.read().await;
            if let Some(ref r) = *reader {
                return Ok(r.clone());
            }
        }

        let reader = self.connector.connect().await?;

        if !self.initialized.load(Ordering::SeqCst) {
            let offset = match self.offsets.load_offset(&self.offset_key).await? {
                Some(committed) => {
                    info!(
                        group_id = %self.offset_key.group_id,
                        offset = committed,
                        "Resuming from committed offset"
                    );
                    self.committed_offset.store(committed, Ordering::SeqCst);
                    committed
                }
                None => reader.offset_at(self.config.start_offset).await?,
            };

            self.fetch_offset.store(offset, Ordering::SeqCst);
            self.initialized.store(true, Ordering::SeqCst);

            info!(
                topic = %self.config.topic,
                partition = self.config.partition,
                offset = offset,
                "Consumer initialized at offset"
            );
        }

        *self.reader.write().await = Some(reader.clone());

        Ok(reader)
    }

    /// Fetches the next batch into the buffer, retrying failed fetches with
    /// a linear backoff. Returns how many were added.
    async fn fill_buffer(&self) -> Result<usize> {
        let mut attempt: u32 = 0;

        loop {
            let error = match self.try_fill().await {
                Ok(added) => {
                    health().redpanda.set_healthy();
                    return Ok(added);
                }
                Err(e) => e,
            };

            metrics().fetch_errors.inc();
            health().redpanda.set_unhealthy(error.clone());
            self.reset_connection().await;

            attempt += 1;
            if attempt > self.config.fetch_retries {
                error!(attempts = attempt, error = %error, "Fetch retries exhausted");
                return Err(Error::upstream(format!(
                    "Fetch failed after {} attempts: {}",
                    attempt, error
                )));
            }

            let backoff = self.config.retry_backoff() * attempt;
            warn!(
                attempt = attempt,
                backoff_ms = %backoff.as_millis(),
                error = %error,
                "Retrying Redpanda fetch"
            );
            tokio::time::sleep(backoff).await;

            if self.is_closed() {
                return Ok(0);
            }
        }
    }

    /// One connect-and-fetch attempt.
    async fn try_fill(&self) -> std::result::Result<usize, String> {
        let reader = self.ensure_connected().await.map_err(|e| e.to_string())?;
        let current = self.fetch_offset.load(Ordering::SeqCst);

        let batch = match reader.fetch(current).await {
            Ok(batch) => batch,
            Err(FetchError::OffsetOutOfRange) => {
                return self.reseed(reader.as_ref(), current).await.map(|_| 0);
            }
            Err(FetchError::Failed(e)) => {
                error!(offset = current, error = %e, "Fetch error");
                return Err(e);
            }
        };

        let mut next_offset = current;
        let mut buffered = self.buffered.lock();
        let before = buffered.len();

        // Compressed batches may start before the requested offset.
        for message in batch.messages.into_iter().filter(|m| m.offset >= current) {
            next_offset = next_offset.max(message.offset + 1);
            buffered.push_back(message);
        }

        let added = buffered.len() - before;
        drop(buffered);

        self.fetch_offset.store(next_offset, Ordering::SeqCst);

        if added > 0 {
            metrics().records_consumed.inc_by(added as u64);
            debug!(
                count = added,
                offset_start = current,
                offset_end = next_offset,
                high_watermark = batch.high_watermark,
                "Fetched messages from Redpanda"
            );
        }

        Ok(added)
    }

    /// Moves the fetch position back inside the retained range.
    async fn reseed(
        &self,
        reader: &dyn PartitionReader,
        stale: i64,
    ) -> std::result::Result<(), String> {
        let offset = reader
            .offset_at(self.config.start_offset)
            .await
            .map_err(|e| e.to_string())?;
        warn!(
            stale_offset = stale,
            offset = offset,
            start_offset = ?self.config.start_offset,
            "Offset out of range, restarting from start offset"
        );
        self.fetch_offset.store(offset, Ordering::SeqCst);
        Ok(())
    }

    /// Stops handing out messages once the buffer is drained.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        info!(topic = %self.config.topic, "Consumer closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Next offset after the last processed message, or -1.
    pub fn committed_offset(&self) -> i64 {
        self.committed_offset.load(Ordering::SeqCst)
    }

    /// Next offset the consumer will fetch, or -1 before the first read.
    pub fn fetch_offset(&self) -> i64 {
        self.fetch_offset.load(Ordering::SeqCst)
    }

    /// Drops the cached connection so the next read reconnects.
    pub async fn reset_connection(&self) {
        *self.reader.write().await = None;
        info!("Consumer connection reset");
    }
}

#[async_trait]
impl MessageSource for Consumer {
    async fn next_message(&self) -> Result<Option<Message>> {
        loop {
            if let Some(message) = self.buffered.lock().pop_front() {
                return Ok(Some(message));
            }

            if self.is_closed() {
                return Ok(None);
            }

            // An empty fetch is a long-poll timeout, not the end of the topic.
            self.fill_buffer().await?;
        }
    }

    /// Advances the committed offset and persists it. A failed save is
    /// logged; the message will be redelivered after a restart.
    async fn commit(&self, message: &Message) -> Result<()> {
        let next = message.offset + 1;
        let prev = self.committed_offset.fetch_max(next, Ordering::SeqCst);
        metrics().committed_offset.set(next.max(prev).max(0) as u64);

        if next <= prev {
            return Ok(());
        }

        if let Err(e) = self.offsets.save_offset(&self.offset_key, next).await {
            metrics().offset_commit_errors.inc();
            warn!(
                group_id = %self.offset_key.group_id,
                offset = next,
                error = %e,
                "Failed to persist committed offset"
            );
            return Ok(());
        }

        debug!(
            partition = message.partition,
            prev_offset = prev,
            new_offset = next,
            "Committed offset"
        );

        Ok(())
    }
}
