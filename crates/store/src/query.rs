//! Reading persisted names back for the cache mirror.

use crate::client::Store;
use crate::error::map_sqlx_error;
use async_trait::async_trait;
use enricher_core::Result;

/// A persisted row's primary key and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredName {
    pub id: i32,
    pub name: String,
}

/// Source of persisted names, read in primary key order.
#[async_trait]
pub trait StoredNames: Send + Sync {
    async fn stored_names(&self) -> Result<Vec<StoredName>>;
}

#[async_trait]
impl StoredNames for Store {
    async fn stored_names(&self) -> Result<Vec<StoredName>> {
        let rows: Vec<(i32, String)> =
            sqlx::query_as("SELECT id, COALESCE(name, '') FROM fiofull ORDER BY id")
                .fetch_all(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| StoredName { id, name })
            .collect())
    }
}

/// Count all persisted rows.
pub async fn count_records(store: &Store) -> Result<i64> {
    sqlx::query_scalar("SELECT count(*) FROM fiofull")
        .fetch_one(store.pool())
        .await
        .map_err(map_sqlx_error)
}
