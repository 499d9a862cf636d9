//! Repository for the `credit_ledger_entries` table and the paired
//! `users.credit_balance` updates.
//!
//! Balance and ledger are written only together, inside one
//! transaction, so the sum-of-entries-equals-balance invariant can
//! never be observed broken. The debit is an atomic
//! decrement-with-floor-check: two concurrent requests can never both
//! succeed against a balance that only covers one.

use sqlx::PgPool;
use thumbforge_core::credits::{refund_amount, usage_amount, LedgerEntryType};
use thumbforge_core::types::DbId;

use crate::models::credit::{CreditLedgerEntry, DebitOutcome};

/// Column list for credit_ledger_entries queries.
const COLUMNS: &str =
    "id, user_id, amount, entry_type_id, description, generation_id, created_at, updated_at";

/// Ledger operations. Every method that moves credits writes the
/// balance and the entry atomically.
pub struct CreditLedgerRepo;

impl CreditLedgerRepo {
    /// Atomically debit `cost` credits for a generation.
    ///
    /// The balance update carries the floor check in its WHERE clause
    /// (`credit_balance >= cost`); if no row qualifies the transaction
    /// is rolled back and [`DebitOutcome::InsufficientFunds`] is
    /// returned without writing anything.
    pub async fn debit_for_generation(
        pool: &PgPool,
        user_id: DbId,
        generation_id: DbId,
        cost: i64,
    ) -> Result<DebitOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE users
             SET credit_balance = credit_balance - $1, updated_at = NOW()
             WHERE id = $2 AND credit_balance >= $1",
        )
        .bind(cost)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(DebitOutcome::InsufficientFunds);
        }

        sqlx::query(
            "INSERT INTO credit_ledger_entries
                (user_id, amount, entry_type_id, description, generation_id)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user_id)
        .bind(usage_amount(cost))
        .bind(LedgerEntryType::Usage.id())
        .bind(format!("Generation #{generation_id}"))
        .bind(generation_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(DebitOutcome::Applied)
    }

    /// Issue the compensating refund for a failed generation.
    ///
    /// Idempotent: the insert targets the partial unique index on
    /// refund entries per generation, so a second call inserts nothing
    /// and leaves the balance untouched. Returns `true` when the
    /// refund was applied by this call.
    pub async fn refund_for_generation(
        pool: &PgPool,
        user_id: DbId,
        generation_id: DbId,
        cost: i64,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO credit_ledger_entries
                (user_id, amount, entry_type_id, description, generation_id)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (generation_id) WHERE entry_type_id = 3 AND generation_id IS NOT NULL DO NOTHING",
        )
        .bind(user_id)
        .bind(refund_amount(cost))
        .bind(LedgerEntryType::Refund.id())
        .bind(format!("Refund for failed generation #{generation_id}"))
        .bind(generation_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "UPDATE users
             SET credit_balance = credit_balance + $1, updated_at = NOW()
             WHERE id = $2",
        )
        .bind(cost)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Grant credits (purchase, bonus, referral bonus).
    ///
    /// `amount` must be positive; usage and refund entries go through
    /// the dedicated methods above.
    pub async fn grant(
        pool: &PgPool,
        user_id: DbId,
        amount: i64,
        entry_type: LedgerEntryType,
        description: &str,
    ) -> Result<CreditLedgerEntry, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE users
             SET credit_balance = credit_balance + $1, updated_at = NOW()
             WHERE id = $2",
        )
        .bind(amount)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO credit_ledger_entries
                (user_id, amount, entry_type_id, description)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, CreditLedgerEntry>(&query)
            .bind(user_id)
            .bind(amount)
            .bind(entry_type.id())
            .bind(description)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(entry)
    }

    /// List a user's entries, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<CreditLedgerEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM credit_ledger_entries
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, CreditLedgerEntry>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List the entries linked to one generation.
    pub async fn list_for_generation(
        pool: &PgPool,
        generation_id: DbId,
    ) -> Result<Vec<CreditLedgerEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM credit_ledger_entries
             WHERE generation_id = $1
             ORDER BY id"
        );
        sqlx::query_as::<_, CreditLedgerEntry>(&query)
            .bind(generation_id)
            .fetch_all(pool)
            .await
    }

    /// Sum of all entries for a user. By invariant this equals
    /// `users.credit_balance`; integration tests assert it.
    pub async fn sum_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (Option<i64>,) = sqlx::query_as(
            "SELECT SUM(amount)::BIGINT FROM credit_ledger_entries WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0.unwrap_or(0))
    }
}
