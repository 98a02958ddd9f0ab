//! Worker scheduler: the record pipeline plus the periodic cache mirror.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::mirror::NameMirrorWorker;
use crate::pipeline::{PipelineStats, RecordPipeline};
use enricher_core::Result;

/// Worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Seconds between cache mirror passes
    #[serde(default = "default_mirror_interval_secs")]
    pub mirror_interval_secs: u64,
    /// Maximum entries held by the in-process cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    /// Seconds to wait for the pipeline to drain on shutdown
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_mirror_interval_secs() -> u64 {
    60
}

fn default_cache_capacity() -> u64 {
    100_000
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            mirror_interval_secs: default_mirror_interval_secs(),
            cache_capacity: default_cache_capacity(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl WorkerConfig {
    pub fn mirror_interval(&self) -> Duration {
        Duration::from_secs(self.mirror_interval_secs.max(1))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Handles to the running workers.
pub struct WorkerHandles {
    /// Finishes when the source closes or fails.
    pub pipeline: JoinHandle<Result<PipelineStats>>,
    pub mirror: JoinHandle<()>,
}

/// Outcome of joining the pipeline task.
pub type PipelineJoin = std::result::Result<Result<PipelineStats>, JoinError>;

/// Waits up to `timeout` for the pipeline task to finish.
///
/// Returns `None` and aborts the task when it is still running at the
/// deadline. Close the consumer first so the pipeline can drain.
pub async fn join_pipeline(
    handle: JoinHandle<Result<PipelineStats>>,
    timeout: Duration,
) -> Option<PipelineJoin> {
    let abort = handle.abort_handle();
    match tokio::time::timeout(timeout, handle).await {
        Ok(joined) => Some(joined),
        Err(_) => {
            warn!(
                timeout_secs = timeout.as_secs(),
                "Record pipeline did not stop before the shutdown deadline"
            );
            abort.abort();
            None
        }
    }
}

/// Starts and owns the background workers.
pub struct WorkerScheduler {
    config: WorkerConfig,
    pipeline: Arc<RecordPipeline>,
    mirror: Arc<NameMirrorWorker>,
}

impl WorkerScheduler {
    pub fn new(
        config: WorkerConfig,
        pipeline: Arc<RecordPipeline>,
        mirror: Arc<NameMirrorWorker>,
    ) -> Self {
        Self {
            config,
            pipeline,
            mirror,
        }
    }

    /// Spawns the pipeline task and the mirror task.
    pub fn start(self: Arc<Self>) -> WorkerHandles {
        let pipeline = self.pipeline.clone();
        let pipeline_handle = tokio::spawn(async move {
            let result = pipeline.run().await;
            if let Err(ref e) = result {
                error!("Record pipeline fatal error: {}", e);
            }
            result
        });
        info!("Record pipeline started");

        let scheduler = self.clone();
        let mirror_handle = tokio::spawn(async move {
            scheduler.run_mirror_worker().await;
        });
        info!(
            interval_secs = self.config.mirror_interval().as_secs(),
            "Cache mirror worker started"
        );

        WorkerHandles {
            pipeline: pipeline_handle,
            mirror: mirror_handle,
        }
    }

    /// Runs one mirror pass immediately (used at shutdown).
    pub async fn mirror_once(&self) {
        if let Err(e) = self.mirror.run().await {
            error!("Cache mirror error: {}", e);
        }
    }

    async fn run_mirror_worker(&self) {
        let mut ticker = interval(self.config.mirror_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.mirror_once().await;
        }
    }
}
