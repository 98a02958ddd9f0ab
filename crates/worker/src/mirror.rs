//! Cache mirror: copies persisted names into the key-value cache.
//!
//! Runs apart from the record pipeline, as a periodic read-and-copy of the
//! store. Keys are built from each row's primary key.

use async_trait::async_trait;
use enricher_core::Result;
use moka::future::Cache;
use std::sync::Arc;
use store::StoredNames;
use telemetry::metrics;
use tracing::{debug, info, warn};

pub const NAME_KEY_PREFIX: &str = "FIOFull";

/// Cache key for a persisted row.
pub fn name_key(id: i32) -> String {
    format!("{}:{}", NAME_KEY_PREFIX, id)
}

/// Best-effort key-value cache.
#[async_trait]
pub trait CacheMirror: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process cache backed by moka.
#[derive(Clone)]
pub struct MokaCacheMirror {
    cache: Cache<String, String>,
}

impl MokaCacheMirror {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_capacity).build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).await
    }
}

#[async_trait]
impl CacheMirror for MokaCacheMirror {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.cache.insert(key.to_string(), value.to_string()).await;
        Ok(())
    }
}

/// Result of one mirror pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub mirrored: u64,
    pub failed: u64,
}

/// Copies `(id, name)` rows from the store into the cache.
pub struct NameMirrorWorker {
    names: Arc<dyn StoredNames>,
    cache: Arc<dyn CacheMirror>,
}

impl NameMirrorWorker {
    pub fn new(names: Arc<dyn StoredNames>, cache: Arc<dyn CacheMirror>) -> Self {
        Self { names, cache }
    }

    /// One full pass. A failed read aborts the pass; a failed cache write
    /// is logged and the pass continues.
    pub async fn run(&self) -> Result<MirrorReport> {
        let rows = self.names.stored_names().await?;
        let mut report = MirrorReport::default();

        for row in rows {
            let key = name_key(row.id);
            match self.cache.set(&key, &row.name).await {
                Ok(()) => report.mirrored += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(key = %key, error = %e, "Failed to mirror name");
                }
            }
        }

        metrics().names_mirrored.inc_by(report.mirrored);
        metrics().mirror_errors.inc_by(report.failed);

        if report.failed > 0 {
            info!(
                mirrored = report.mirrored,
                failed = report.failed,
                "Mirror pass finished with errors"
            );
        } else {
            debug!(mirrored = report.mirrored, "Mirror pass finished");
        }

        Ok(report)
    }
}
