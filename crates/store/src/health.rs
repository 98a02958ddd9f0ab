//! PostgreSQL health checks.

use crate::client::Store;
use tracing::{debug, error};

/// Check PostgreSQL connection health.
pub async fn check_connection(store: &Store) -> bool {
    match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(store.pool())
        .await
    {
        Ok(_) => {
            debug!("PostgreSQL connection healthy");
            true
        }
        Err(e) => {
            error!("PostgreSQL health check failed: {}", e);
            false
        }
    }
}
