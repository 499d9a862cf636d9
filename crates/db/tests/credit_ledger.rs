//! Integration tests for the credit ledger: atomic debit with floor
//! check, refund idempotence, and the balance-equals-ledger-sum
//! invariant.

mod common;

use common::{seed_generation, seed_user};
use sqlx::PgPool;
use thumbforge_core::credits::LedgerEntryType;
use thumbforge_db::models::credit::DebitOutcome;
use thumbforge_db::repositories::{CreditLedgerRepo, UserRepo};

#[sqlx::test(migrations = "../../db/migrations")]
async fn grant_updates_balance_and_ledger_together(pool: PgPool) {
    let user_id = seed_user(&pool, "grant@example.com", 10).await;

    assert_eq!(UserRepo::balance(&pool, user_id).await.unwrap(), Some(10));
    assert_eq!(CreditLedgerRepo::sum_for_user(&pool, user_id).await.unwrap(), 10);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn debit_writes_usage_entry_and_lowers_balance(pool: PgPool) {
    let user_id = seed_user(&pool, "debit@example.com", 10).await;
    let generation_id = seed_generation(&pool, user_id).await;

    let outcome = CreditLedgerRepo::debit_for_generation(&pool, user_id, generation_id, 2)
        .await
        .unwrap();
    assert_eq!(outcome, DebitOutcome::Applied);

    assert_eq!(UserRepo::balance(&pool, user_id).await.unwrap(), Some(8));
    assert_eq!(CreditLedgerRepo::sum_for_user(&pool, user_id).await.unwrap(), 8);

    let entries = CreditLedgerRepo::list_for_generation(&pool, generation_id)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, -2);
    assert_eq!(entries[0].entry_type(), Some(LedgerEntryType::Usage));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn debit_respects_the_floor(pool: PgPool) {
    let user_id = seed_user(&pool, "floor@example.com", 1).await;
    let generation_id = seed_generation(&pool, user_id).await;

    let outcome = CreditLedgerRepo::debit_for_generation(&pool, user_id, generation_id, 2)
        .await
        .unwrap();
    assert_eq!(outcome, DebitOutcome::InsufficientFunds);

    // Nothing was written: balance intact, no ledger entry.
    assert_eq!(UserRepo::balance(&pool, user_id).await.unwrap(), Some(1));
    assert!(CreditLedgerRepo::list_for_generation(&pool, generation_id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refund_restores_balance_exactly_once(pool: PgPool) {
    let user_id = seed_user(&pool, "refund@example.com", 10).await;
    let generation_id = seed_generation(&pool, user_id).await;

    CreditLedgerRepo::debit_for_generation(&pool, user_id, generation_id, 2)
        .await
        .unwrap();

    let first = CreditLedgerRepo::refund_for_generation(&pool, user_id, generation_id, 2)
        .await
        .unwrap();
    let second = CreditLedgerRepo::refund_for_generation(&pool, user_id, generation_id, 2)
        .await
        .unwrap();
    assert!(first);
    assert!(!second, "second refund must be a no-op");

    // Net zero versus pre-request, and exactly two linked entries.
    assert_eq!(UserRepo::balance(&pool, user_id).await.unwrap(), Some(10));
    let entries = CreditLedgerRepo::list_for_generation(&pool, generation_id)
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries.iter().map(|e| e.amount).sum::<i64>(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_debits_with_funds_for_one_allow_exactly_one(pool: PgPool) {
    let user_id = seed_user(&pool, "race@example.com", 2).await;
    let first_generation = seed_generation(&pool, user_id).await;
    let second_generation = seed_generation(&pool, user_id).await;

    let (a, b) = tokio::join!(
        CreditLedgerRepo::debit_for_generation(&pool, user_id, first_generation, 2),
        CreditLedgerRepo::debit_for_generation(&pool, user_id, second_generation, 2),
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let applied = outcomes
        .iter()
        .filter(|o| **o == DebitOutcome::Applied)
        .count();
    assert_eq!(applied, 1, "exactly one debit may succeed, got {outcomes:?}");
    assert_eq!(UserRepo::balance(&pool, user_id).await.unwrap(), Some(0));
    assert_eq!(CreditLedgerRepo::sum_for_user(&pool, user_id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ledger_sum_always_equals_balance(pool: PgPool) {
    let user_id = seed_user(&pool, "invariant@example.com", 20).await;
    let generation_id = seed_generation(&pool, user_id).await;

    CreditLedgerRepo::grant(&pool, user_id, 5, LedgerEntryType::Bonus, "Welcome bonus")
        .await
        .unwrap();
    CreditLedgerRepo::grant(&pool, user_id, 3, LedgerEntryType::ReferralBonus, "Referral")
        .await
        .unwrap();
    CreditLedgerRepo::debit_for_generation(&pool, user_id, generation_id, 2)
        .await
        .unwrap();
    CreditLedgerRepo::refund_for_generation(&pool, user_id, generation_id, 2)
        .await
        .unwrap();

    let balance = UserRepo::balance(&pool, user_id).await.unwrap().unwrap();
    let sum = CreditLedgerRepo::sum_for_user(&pool, user_id).await.unwrap();
    assert_eq!(balance, sum);
    assert_eq!(balance, 28);
}
