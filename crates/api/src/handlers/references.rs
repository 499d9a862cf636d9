//! Handlers for the read-only reference catalog surface.
//!
//! Routes:
//! - `GET /references` — list active references, optionally filtered

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use thumbforge_db::repositories::ReferenceRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /references`.
#[derive(Debug, Deserialize)]
pub struct ReferenceListQuery {
    pub style: Option<String>,
    pub category: Option<String>,
}

/// GET /api/v1/references
///
/// Active references ordered by viral score descending.
pub async fn list_references(
    State(state): State<AppState>,
    Query(query): Query<ReferenceListQuery>,
) -> AppResult<impl IntoResponse> {
    let references = ReferenceRepo::list_active(
        &state.pool,
        query.style.as_deref(),
        query.category.as_deref(),
    )
    .await?;

    Ok(Json(DataResponse { data: references }))
}
