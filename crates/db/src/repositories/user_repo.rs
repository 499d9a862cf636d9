//! Repository for the `users` table.

use sqlx::PgPool;
use thumbforge_core::types::DbId;

use crate::models::user::{CreateUser, User};

/// Column list for users queries.
const COLUMNS: &str = "id, email, display_name, credit_balance, created_at, updated_at";

/// Provides CRUD operations for users.
///
/// Note: `credit_balance` is only ever written by
/// [`CreditLedgerRepo`](crate::repositories::CreditLedgerRepo), always
/// in the same transaction as a ledger entry.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user with a zero balance, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, display_name)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.display_name)
            .fetch_one(pool)
            .await
    }

    /// Find a user by primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Current credit balance for a user.
    pub async fn balance(pool: &PgPool, id: DbId) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT credit_balance FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
