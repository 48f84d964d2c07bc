//! End-to-end ledger engine tests over the SQLite repositories.

use std::sync::Arc;

use rpbank_core::auth::{Actor, UserRole};
use rpbank_core::ledger::{
    AccountKind, Destination, LedgerConfig, LedgerEngine, LedgerError, TransferRequest,
};
use rpbank_core::registry::RegistryService;
use rpbank_db::{Repositories, connect, migrate};
use rpbank_shared::types::UserId;
use rust_decimal_macros::dec;

async fn repositories() -> Repositories {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    migrate(&db).await.expect("Failed to run migrations");
    Repositories::new(&db)
}

#[tokio::test]
async fn test_transfer_persists_both_legs() {
    let repos = repositories().await;
    let engine = LedgerEngine::new(Arc::new(repos.accounts.clone()), LedgerConfig::default());
    let user = UserId::new();
    let admin = Actor::new(UserId::new(), UserRole::Administrator);

    let checking = engine
        .open_account(user, "Checking", AccountKind::Personal)
        .await
        .unwrap();
    let savings = engine
        .open_account(user, "Savings", AccountKind::Personal)
        .await
        .unwrap();
    engine
        .post_adjustment(admin, user, checking.id, dec!(100), None)
        .await
        .unwrap();

    engine
        .transfer(
            user,
            TransferRequest {
                from_account_id: checking.id,
                destination: Destination::ByNumber(savings.account_number.to_string()),
                amount: dec!(40),
                description: None,
            },
        )
        .await
        .unwrap();

    // A fresh engine sees only what was written to the database.
    let reloaded = LedgerEngine::new(Arc::new(repos.accounts.clone()), LedgerConfig::default());
    let checking = reloaded.get_account(user, checking.id).await.unwrap();
    let savings = reloaded.get_account(user, savings.id).await.unwrap();
    assert_eq!(checking.balance, dec!(60));
    assert_eq!(savings.balance, dec!(40));
    assert!(checking.is_reconciled());
    assert!(savings.is_reconciled());
}

#[tokio::test]
async fn test_failed_transfer_writes_nothing() {
    let repos = repositories().await;
    let engine = LedgerEngine::new(Arc::new(repos.accounts.clone()), LedgerConfig::default());
    let user = UserId::new();

    let checking = engine
        .open_account(user, "Checking", AccountKind::Personal)
        .await
        .unwrap();
    let before = engine.list_accounts(user, None).await.unwrap();

    let err = engine
        .transfer(
            user,
            TransferRequest {
                from_account_id: checking.id,
                destination: Destination::ByNumber("9999 9999 9999 9999".to_string()),
                amount: dec!(1),
                description: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    assert_eq!(engine.list_accounts(user, None).await.unwrap(), before);
}

#[tokio::test]
async fn test_registry_over_database() {
    let repos = repositories().await;
    let registry = RegistryService::new(Arc::new(repos.users.clone()));

    let admin = registry.register("root", None, "password-1").await.unwrap();
    let member = registry.register("guest", Some("Guest"), "password-2").await.unwrap();

    assert_eq!(admin.role, UserRole::Administrator);
    assert_eq!(member.role, UserRole::Member);

    let logged_in = registry.authenticate("ROOT", "password-1").await.unwrap();
    assert_eq!(logged_in.id, admin.id);
}
