//! Credit ledger domain rules.
//!
//! Balances are never mutated out of band: every movement is a ledger
//! entry whose signed amount is derived here, and the persistence layer
//! writes balance and entry in one transaction.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default credits charged per generation. Overridable via
/// configuration; tests and the seed data assume this value.
pub const DEFAULT_GENERATION_COST: i64 = 2;

/// Ledger entry kind. Discriminants match the seed order of the
/// `ledger_entry_types` lookup table (1-based).
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryType {
    Purchase = 1,
    Usage = 2,
    Refund = 3,
    Bonus = 4,
    ReferralBonus = 5,
}

impl LedgerEntryType {
    pub fn id(self) -> i16 {
        self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::Purchase),
            2 => Some(Self::Usage),
            3 => Some(Self::Refund),
            4 => Some(Self::Bonus),
            5 => Some(Self::ReferralBonus),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Usage => "usage",
            Self::Refund => "refund",
            Self::Bonus => "bonus",
            Self::ReferralBonus => "referral_bonus",
        }
    }

    /// Whether entries of this type carry a negative amount.
    pub fn is_debit(self) -> bool {
        matches!(self, Self::Usage)
    }
}

/// Signed ledger amount for a usage entry.
pub fn usage_amount(cost: i64) -> i64 {
    -cost
}

/// Signed ledger amount for the refund compensating a usage entry.
pub fn refund_amount(cost: i64) -> i64 {
    cost
}

/// A generation cost must be strictly positive.
pub fn validate_cost(cost: i64) -> Result<(), CoreError> {
    if cost <= 0 {
        return Err(CoreError::Validation(format!(
            "Generation credit cost must be positive, got {cost}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_and_refund_amounts_cancel() {
        assert_eq!(usage_amount(DEFAULT_GENERATION_COST) + refund_amount(DEFAULT_GENERATION_COST), 0);
    }

    #[test]
    fn entry_type_ids_round_trip() {
        for entry_type in [
            LedgerEntryType::Purchase,
            LedgerEntryType::Usage,
            LedgerEntryType::Refund,
            LedgerEntryType::Bonus,
            LedgerEntryType::ReferralBonus,
        ] {
            assert_eq!(LedgerEntryType::from_id(entry_type.id()), Some(entry_type));
        }
        assert_eq!(LedgerEntryType::from_id(0), None);
    }

    #[test]
    fn only_usage_is_a_debit() {
        assert!(LedgerEntryType::Usage.is_debit());
        assert!(!LedgerEntryType::Purchase.is_debit());
        assert!(!LedgerEntryType::Refund.is_debit());
    }

    #[test]
    fn non_positive_cost_rejected() {
        assert!(validate_cost(0).is_err());
        assert!(validate_cost(-1).is_err());
        assert!(validate_cost(2).is_ok());
    }
}
