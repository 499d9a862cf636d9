//! Liveness endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::error::AppResult;
use crate::state::AppState;

/// Build the root-level health router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health
///
/// Verifies the database answers before reporting healthy.
async fn health(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    thumbforge_db::health_check(&state.pool).await?;
    Ok(Json(json!({ "status": "ok" })))
}
