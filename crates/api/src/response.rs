//! Response bodies.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub redpanda_connected: bool,
    pub postgres_connected: bool,
    pub records_persisted: u64,
    pub records_skipped: u64,
}

/// A name served from the cache.
#[derive(Debug, Serialize, Deserialize)]
pub struct NameResponse {
    pub id: i32,
    pub name: String,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
