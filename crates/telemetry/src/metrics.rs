//! In-process pipeline metrics.
//!
//! Counters are updated by the pipeline and exposed as a JSON snapshot by
//! the health server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (last written value).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns (upper bound ms, count) pairs.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the enrichment pipeline.
#[derive(Debug, Default)]
pub struct Metrics {
    // Pipeline outcomes
    pub records_consumed: Counter,
    pub records_malformed: Counter,
    pub enrichment_failures: Counter,
    pub persist_failures: Counter,
    pub records_persisted: Counter,

    // Redpanda consumer
    pub fetch_errors: Counter,
    pub offset_commit_errors: Counter,

    // Predictor calls
    pub predictor_calls: Counter,
    pub predictor_errors: Counter,

    // Cache mirror
    pub names_mirrored: Counter,
    pub mirror_errors: Counter,

    // Latency histograms
    pub predictor_latency_ms: Histogram,
    pub enrichment_latency_ms: Histogram,
    pub persist_latency_ms: Histogram,

    // Gauges
    pub committed_offset: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            records_consumed: self.records_consumed.get(),
            records_malformed: self.records_malformed.get(),
            enrichment_failures: self.enrichment_failures.get(),
            persist_failures: self.persist_failures.get(),
            records_persisted: self.records_persisted.get(),
            fetch_errors: self.fetch_errors.get(),
            offset_commit_errors: self.offset_commit_errors.get(),
            predictor_calls: self.predictor_calls.get(),
            predictor_errors: self.predictor_errors.get(),
            names_mirrored: self.names_mirrored.get(),
            mirror_errors: self.mirror_errors.get(),
            predictor_latency_mean_ms: self.predictor_latency_ms.mean(),
            enrichment_latency_mean_ms: self.enrichment_latency_ms.mean(),
            persist_latency_mean_ms: self.persist_latency_ms.mean(),
            committed_offset: self.committed_offset.get(),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub records_consumed: u64,
    pub records_malformed: u64,
    pub enrichment_failures: u64,
    pub persist_failures: u64,
    pub records_persisted: u64,
    pub fetch_errors: u64,
    pub offset_commit_errors: u64,
    pub predictor_calls: u64,
    pub predictor_errors: u64,
    pub names_mirrored: u64,
    pub mirror_errors: u64,
    pub predictor_latency_mean_ms: f64,
    pub enrichment_latency_mean_ms: f64,
    pub persist_latency_mean_ms: f64,
    pub committed_offset: u64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
