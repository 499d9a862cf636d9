//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thumbforge_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub display_name: String,
    /// Always equals the sum of the user's credit ledger entries.
    pub credit_balance: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub display_name: String,
}
