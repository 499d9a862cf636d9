//! Credit ledger models.

use serde::Serialize;
use sqlx::FromRow;
use thumbforge_core::credits::LedgerEntryType;
use thumbforge_core::types::{DbId, Timestamp};

/// A row from the `credit_ledger_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CreditLedgerEntry {
    pub id: DbId,
    pub user_id: DbId,
    /// Signed amount: negative for usage, positive otherwise.
    pub amount: i64,
    pub entry_type_id: i16,
    pub description: String,
    pub generation_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CreditLedgerEntry {
    pub fn entry_type(&self) -> Option<LedgerEntryType> {
        LedgerEntryType::from_id(self.entry_type_id)
    }
}

/// Result of an attempted debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    /// Balance updated and the usage entry written.
    Applied,
    /// The floor check failed: the balance never went negative and no
    /// entry was written.
    InsufficientFunds,
}
