//! Durable consumer positions.
//!
//! The partition client has no group coordination, so the consumer keeps
//! its own committed offset per (group, topic, partition) in an
//! [`OffsetStore`] and resumes from it on restart.

use crate::config::RedpandaConfig;
use async_trait::async_trait;
use enricher_core::Result;

/// Identifies one committed position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OffsetKey {
    pub group_id: String,
    pub topic: String,
    pub partition: i32,
}

impl OffsetKey {
    pub fn from_config(config: &RedpandaConfig) -> Self {
        Self {
            group_id: config.group_id.clone(),
            topic: config.topic.clone(),
            partition: config.partition,
        }
    }
}

/// Persists the next offset to read for a consumer group.
#[async_trait]
pub trait OffsetStore: Send + Sync {
    /// Next offset to read, if the group ever committed.
    async fn load_offset(&self, key: &OffsetKey) -> Result<Option<i64>>;

    /// Records `next_offset` as the position to resume from.
    async fn save_offset(&self, key: &OffsetKey, next_offset: i64) -> Result<()>;
}

#[cfg(test)]
pub(crate) use memory::MemoryOffsetStore;
