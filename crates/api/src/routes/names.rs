//! Cached name lookup.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use worker::name_key;

use crate::response::{ErrorResponse, NameResponse};
use crate::state::AppState;

/// GET /names/:id - Name of a persisted row, served from the cache.
pub async fn name_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<NameResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.cache.get(&name_key(id)).await {
        Some(name) => Ok(Json(NameResponse { id, name })),
        None => {
            debug!(id = id, "Cache miss");
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(format!("no cached name for id {}", id))),
            ))
        }
    }
}
