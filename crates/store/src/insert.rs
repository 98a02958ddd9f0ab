//! Writing enriched records.

use crate::client::Store;
use crate::error::map_sqlx_error;
use async_trait::async_trait;
use enricher_core::{EnrichedRecord, Result};
use std::time::Instant;
use telemetry::{health, metrics};
use tracing::debug;

pub const INSERT_ENRICHED: &str = "INSERT INTO fiofull \
     (name, surname, patronymic, age, gender, national) \
     VALUES ($1, $2, $3, $4, $5, $6)";

/// Durable destination for enriched records.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Stores one record. Rejected rows surface as `Error::Constraint`.
    async fn insert(&self, record: &EnrichedRecord) -> Result<()>;
}

#[async_trait]
impl PersistenceSink for Store {
    async fn insert(&self, record: &EnrichedRecord) -> Result<()> {
        let start = Instant::now();

        sqlx::query(INSERT_ENRICHED)
            .bind(&record.name)
            .bind(&record.surname)
            .bind(&record.patronymic)
            .bind(record.age)
            .bind(&record.gender)
            .bind(&record.nationality)
            .execute(self.pool())
            .await
            .map_err(|e| {
                let err = map_sqlx_error(e);
                // A rejected row says nothing about the connection.
                if err.kind() == "transport" {
                    health().postgres.set_unhealthy(err.to_string());
                }
                err
            })?;
        health().postgres.set_healthy();

        let elapsed = start.elapsed();
        metrics()
            .persist_latency_ms
            .observe(elapsed.as_millis() as u64);

        debug!(
            name = %record.name,
            latency_ms = %elapsed.as_millis(),
            "Inserted enriched record"
        );
        Ok(())
    }
}
