//! Health and metrics endpoints.

use axum::{http::StatusCode, Json};
use telemetry::{health, metrics, MetricsSnapshot};

use crate::response::HealthResponse;

/// GET /health - Full health check.
pub async fn health_handler() -> Json<HealthResponse> {
    let report = health().report();
    let m = metrics();

    Json(HealthResponse {
        status: report.status.as_str().to_string(),
        redpanda_connected: health().redpanda.is_healthy(),
        postgres_connected: health().postgres.is_healthy(),
        records_persisted: m.records_persisted.get(),
        records_skipped: m.records_malformed.get()
            + m.enrichment_failures.get()
            + m.persist_failures.get(),
    })
}

/// GET /health/ready - Readiness check.
pub async fn ready_handler() -> StatusCode {
    if health().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness check.
pub async fn live_handler() -> StatusCode {
    if health().is_alive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /metrics - Pipeline counters as JSON.
pub async fn metrics_handler() -> Json<MetricsSnapshot> {
    Json(metrics().snapshot())
}
