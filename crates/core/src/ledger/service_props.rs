//! Property-based tests for the ledger engine.
//!
//! Conservation on internal transfers, untouched state on rejected transfers,
//! and log consistency after administrative edits.

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;
use rpbank_shared::types::{AccountId, Currency, UserId};

use super::error::LedgerError;
use super::number::AccountNumber;
use super::service::{LedgerConfig, LedgerEngine};
use super::types::{Account, AccountKind, Destination, TransferRequest};
use crate::auth::{Actor, UserRole};
use crate::store::{AccountStore, InMemoryStore};

/// Amounts from 0.01 to 10,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn account(number: &str, balance: Decimal) -> Account {
    let mut acc = Account::open(
        "Prop",
        AccountKind::Personal,
        AccountNumber::parse(number).unwrap(),
        Currency::Eur,
    );
    acc.balance = balance;
    acc
}

/// Engine with two accounts holding `balance_a` and `balance_b`.
async fn setup(
    balance_a: Decimal,
    balance_b: Decimal,
) -> (Arc<InMemoryStore>, LedgerEngine, UserId, AccountId, AccountId) {
    let store = Arc::new(InMemoryStore::new());
    let engine = LedgerEngine::new(store.clone(), LedgerConfig::default());
    let user = UserId::new();
    let a = account("1111 1111 1111 1111", balance_a);
    let b = account("2222 2222 2222 2222", balance_b);
    let ids = (a.id, b.id);
    store.save(user, vec![a, b]).await.unwrap();
    (store, engine, user, ids.0, ids.1)
}

fn transfer(from: AccountId, to: AccountId, amount: Decimal) -> TransferRequest {
    TransferRequest {
        from_account_id: from,
        destination: Destination::Internal(to),
        amount,
        description: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Internal transfers move exactly `amount` and post opposite entries.
    #[test]
    fn prop_internal_transfer_conserves_money(
        balance_a in amount(),
        balance_b in amount(),
        spend in amount(),
    ) {
        prop_assume!(spend <= balance_a);

        runtime().block_on(async {
            let (_, engine, user, a, b) = setup(balance_a, balance_b).await;

            let receipt = engine.transfer(user, transfer(a, b, spend)).await.unwrap();
            let credit = receipt.credit.unwrap();

            let source = engine.get_account(user, a).await.unwrap();
            let dest = engine.get_account(user, b).await.unwrap();

            prop_assert_eq!(source.balance + spend, balance_a);
            prop_assert_eq!(dest.balance - spend, balance_b);
            prop_assert_eq!(receipt.debit.amount, -credit.amount);
            prop_assert_eq!(credit.amount, spend);
            prop_assert_eq!(source.balance + dest.balance, balance_a + balance_b);
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Overdrafts are rejected and leave the stored accounts as they were.
    #[test]
    fn prop_insufficient_funds_leaves_state_unchanged(
        balance_a in amount(),
        excess in amount(),
    ) {
        runtime().block_on(async {
            let (store, engine, user, a, b) = setup(balance_a, Decimal::ZERO).await;
            let before = store.load(user).await.unwrap();

            let result = engine.transfer(user, transfer(a, b, balance_a + excess)).await;

            prop_assert!(
                matches!(result, Err(LedgerError::InsufficientFunds { .. })),
                "expected InsufficientFunds, got {:?}",
                result
            );
            prop_assert_eq!(store.load(user).await.unwrap(), before);
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Starting reconciled, any sequence of transfers, adjustments and
    /// transaction deletions keeps every account reconciled.
    #[test]
    fn prop_ledger_operations_preserve_reconciliation(
        ops in prop::collection::vec((0u8..3, amount(), any::<bool>()), 1..20),
    ) {
        runtime().block_on(async {
            let (_, engine, user, a, b) = setup(Decimal::ZERO, Decimal::ZERO).await;
            let admin = Actor::new(UserId::new(), UserRole::Administrator);
            engine
                .post_adjustment(admin, user, a, Decimal::new(500_000, 2), None)
                .await
                .unwrap();

            for (op, value, flip) in ops {
                let (from, to) = if flip { (b, a) } else { (a, b) };
                match op {
                    0 => {
                        let _ = engine.transfer(user, transfer(from, to, value)).await;
                    }
                    1 => {
                        engine.post_adjustment(admin, user, from, value, None).await.unwrap();
                    }
                    _ => {
                        let acc = engine.get_account(user, from).await.unwrap();
                        if let Some(tx) = acc.transactions.last() {
                            engine
                                .delete_transaction(admin, user, from, &tx.id)
                                .await
                                .unwrap();
                        }
                    }
                }
            }

            for id in [a, b] {
                let acc = engine.get_account(user, id).await.unwrap();
                prop_assert!(acc.is_reconciled(), "account drifted: {:?}", acc.balance);
                prop_assert!(acc.transactions.iter().all(|tx| tx.is_consistent()));
            }
            prop_assert!(engine.audit(user).await.unwrap().is_empty());
            Ok::<(), TestCaseError>(())
        })?;
    }
}
