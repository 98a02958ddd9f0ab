//! Consumer offsets kept next to the records they produced.

use crate::client::Store;
use crate::error::map_sqlx_error;
use async_trait::async_trait;
use enricher_core::Result;
use redpanda::{OffsetKey, OffsetStore};
use tracing::debug;

pub const LOAD_OFFSET: &str = "SELECT next_offset FROM consumer_offsets \
     WHERE group_id = $1 AND topic = $2 AND partition = $3";

/// Upsert that never moves a stored offset backwards.
pub const SAVE_OFFSET: &str = "INSERT INTO consumer_offsets \
     (group_id, topic, partition, next_offset) VALUES ($1, $2, $3, $4) \
     ON CONFLICT (group_id, topic, partition) DO UPDATE \
     SET next_offset = GREATEST(consumer_offsets.next_offset, EXCLUDED.next_offset), \
         updated_at = now()";

#[async_trait]
impl OffsetStore for Store {
    async fn load_offset(&self, key: &OffsetKey) -> Result<Option<i64>> {
        sqlx::query_scalar(LOAD_OFFSET)
            .bind(&key.group_id)
            .bind(&key.topic)
            .bind(key.partition)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn save_offset(&self, key: &OffsetKey, next_offset: i64) -> Result<()> {
        sqlx::query(SAVE_OFFSET)
            .bind(&key.group_id)
            .bind(&key.topic)
            .bind(key.partition)
            .bind(next_offset)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        debug!(
            group_id = %key.group_id,
            partition = key.partition,
            offset = next_offset,
            "Saved consumer offset"
        );
        Ok(())
    }
}
