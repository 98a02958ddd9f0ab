//! PostgreSQL pool wrapper.

use crate::config::StoreConfig;
use crate::error::map_sqlx_error;
use enricher_core::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

/// Handle to the enriched record store. Clones share the pool.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Opens the pool and verifies a connection can be made.
    pub async fn connect(config: StoreConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(map_sqlx_error)?;

        info!(
            max_connections = config.max_connections,
            "Connected to PostgreSQL"
        );

        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
