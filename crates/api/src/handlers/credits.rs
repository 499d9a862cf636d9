//! Handlers for credit balances and the ledger.
//!
//! Routes:
//! - `GET /users/{id}/credits` — balance plus ledger entries

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use thumbforge_core::error::CoreError;
use thumbforge_core::types::DbId;
use thumbforge_db::models::credit::CreditLedgerEntry;
use thumbforge_db::repositories::{CreditLedgerRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Balance and history for one user.
#[derive(Debug, Serialize)]
pub struct CreditsResponse {
    pub user_id: DbId,
    pub balance: i64,
    pub entries: Vec<CreditLedgerEntry>,
}

/// GET /api/v1/users/{id}/credits
pub async fn get_credits(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let balance = UserRepo::balance(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    let entries = CreditLedgerRepo::list_for_user(&state.pool, user_id).await?;

    Ok(Json(DataResponse {
        data: CreditsResponse {
            user_id,
            balance,
            entries,
        },
    }))
}
