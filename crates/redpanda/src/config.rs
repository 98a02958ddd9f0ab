//! Redpanda configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where a consumer starts when it has no position yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartOffset {
    Earliest,
    Latest,
}

/// Redpanda connection, consumer and producer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedpandaConfig {
    /// Broker addresses
    pub brokers: Vec<String>,
    /// Topic carrying name records
    #[serde(default = "default_topic")]
    pub topic: String,
    /// Consumer group id; committed offsets are stored under it
    #[serde(default = "default_group_id")]
    pub group_id: String,
    #[serde(default)]
    pub partition: i32,
    /// Upper bound on bytes returned by one fetch
    #[serde(default = "default_fetch_max_bytes")]
    pub fetch_max_bytes: i32,
    /// Long-poll wait for a fetch in milliseconds
    #[serde(default = "default_fetch_wait_ms")]
    pub fetch_wait_ms: i32,
    /// Used only when the group has no committed offset
    #[serde(default = "default_start_offset")]
    pub start_offset: StartOffset,
    /// Deadline for connecting and opening the partition
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Failed fetches retried before the consumer gives up
    #[serde(default = "default_fetch_retries")]
    pub fetch_retries: u32,
    /// Retry backoff in milliseconds, multiplied by the attempt number
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Compression for published records (none, gzip, snappy, lz4, zstd)
    #[serde(default = "default_compression")]
    pub compression: String,
    /// SASL username (for cloud authentication)
    #[serde(default)]
    pub sasl_username: Option<String>,
    /// SASL password (for cloud authentication)
    #[serde(default)]
    pub sasl_password: Option<String>,
}

fn default_topic() -> String {
    "my-topic-1".to_string()
}

fn default_group_id() -> String {
    "andre".to_string()
}

fn default_fetch_max_bytes() -> i32 {
    10_000_000
}

fn default_fetch_wait_ms() -> i32 {
    1000
}

fn default_start_offset() -> StartOffset {
    StartOffset::Earliest
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_fetch_retries() -> u32 {
    5
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_compression() -> String {
    "none".to_string()
}

impl Default for RedpandaConfig {
    fn default() -> Self {
        Self {
            brokers: vec!["localhost:9092".to_string()],
            topic: default_topic(),
            group_id: default_group_id(),
            partition: 0,
            fetch_max_bytes: default_fetch_max_bytes(),
            fetch_wait_ms: default_fetch_wait_ms(),
            start_offset: default_start_offset(),
            connect_timeout_secs: default_connect_timeout_secs(),
            fetch_retries: default_fetch_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            compression: default_compression(),
            sasl_username: None,
            sasl_password: None,
        }
    }
}

impl RedpandaConfig {
    /// Returns the broker list as a comma-separated string.
    pub fn broker_string(&self) -> String {
        self.brokers.join(",")
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Upper bound for one fetch round trip: the long-poll wait plus the
    /// connect deadline.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_wait_ms.max(0) as u64) + self.connect_timeout()
    }
}
