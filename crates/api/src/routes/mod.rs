//! API routes.

pub mod health;
pub mod names;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .route("/metrics", get(health::metrics_handler))
        .route("/names/:id", get(names::name_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
