//! Route tree.
//!
//! ```text
//! /health                          liveness + db ping
//!
//! /api/v1/generations              run the pipeline (POST)
//! /api/v1/generations/{id}         fetch a record (GET)
//! /api/v1/users/{id}/credits       balance + ledger (GET)
//! /api/v1/references               active catalog listing (GET)
//! ```

pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/generations", post(handlers::generation::generate))
        .route("/generations/{id}", get(handlers::generation::get_generation))
        .route("/users/{id}/credits", get(handlers::credits::get_credits))
        .route("/references", get(handlers::references::list_references))
}
