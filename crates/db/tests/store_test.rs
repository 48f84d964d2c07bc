//! Integration tests for the SeaORM repositories against in-memory SQLite.

use chrono::Utc;
use rpbank_core::auth::UserRole;
use rpbank_core::directory::Contact;
use rpbank_core::ledger::{Account, AccountKind, AccountNumber, Transaction, TransactionCategory};
use rpbank_core::registry::{SiteSettings, UserProfile};
use rpbank_core::store::{
    AccountStore, ContactStore, SiteSettingsStore, StoreError, UserRegistryStore,
};
use rpbank_db::{Repositories, connect, migrate};
use rpbank_shared::types::{ContactId, Currency, PostingLeg, TransactionId, UserId};
use rust_decimal_macros::dec;

async fn repositories() -> Repositories {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    migrate(&db).await.expect("Failed to run migrations");
    Repositories::new(&db)
}

fn profile(username: &str, role: UserRole) -> UserProfile {
    UserProfile {
        id: UserId::new(),
        username: username.to_string(),
        display_name: username.to_uppercase(),
        credential_hash: "$argon2id$test_hash".to_string(),
        role,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_account_set_round_trip() {
    let repos = repositories().await;
    let user = UserId::new();

    assert!(repos.accounts.load(user).await.unwrap().is_empty());

    let mut checking = Account::open(
        "Checking",
        AccountKind::Personal,
        AccountNumber::parse("1234 5678 9012 3456").unwrap(),
        Currency::Eur,
    );
    checking.post(Transaction::new(
        TransactionId::single(PostingLeg::Adjustment),
        dec!(120.55),
        "Opening deposit",
        Some(TransactionCategory::Adjustment),
        Utc::now(),
    ))
    .unwrap();
    let savings = Account::open(
        "Savings",
        AccountKind::Business,
        AccountNumber::parse("6543 2109 8765 4321").unwrap(),
        Currency::Eur,
    );

    repos
        .accounts
        .save(user, vec![checking.clone(), savings.clone()])
        .await
        .unwrap();

    let loaded = repos.accounts.load(user).await.unwrap();
    assert_eq!(loaded, vec![checking, savings]);
    assert_eq!(loaded[0].balance, dec!(120.55));
}

#[tokio::test]
async fn test_account_set_save_replaces_previous() {
    let repos = repositories().await;
    let user = UserId::new();
    let other = UserId::new();
    let number = AccountNumber::parse("1111 2222 3333 4444").unwrap();

    let first = Account::open("First", AccountKind::Personal, number.clone(), Currency::Eur);
    let second = Account::open("Second", AccountKind::Personal, number, Currency::Eur);

    repos.accounts.save(user, vec![first.clone()]).await.unwrap();
    repos.accounts.save(other, vec![first]).await.unwrap();
    repos.accounts.save(user, vec![second.clone()]).await.unwrap();

    assert_eq!(repos.accounts.load(user).await.unwrap(), vec![second]);
    assert_eq!(repos.accounts.load(other).await.unwrap().len(), 1);

    repos.accounts.save(user, Vec::new()).await.unwrap();
    assert!(repos.accounts.load(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_contact_book_round_trip() {
    let repos = repositories().await;
    let user = UserId::new();

    let contact = Contact {
        id: ContactId::new(),
        name: "Landlord".to_string(),
        account_number: "FR76 3000 6000 0112 3456 7890 189".to_string(),
        bank_label: "External bank".to_string(),
    };

    repos
        .contacts
        .save_contacts(user, vec![contact.clone()])
        .await
        .unwrap();

    assert_eq!(repos.contacts.load_contacts(user).await.unwrap(), vec![contact]);
    assert!(repos.contacts.load_contacts(UserId::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_user_insert_and_lookup() {
    let repos = repositories().await;
    let alice = profile("Alice", UserRole::Administrator);

    repos.users.insert_user(alice.clone()).await.unwrap();

    let by_id = repos.users.find_user(alice.id).await.unwrap().unwrap();
    assert_eq!(by_id.username, "Alice");
    assert_eq!(by_id.role, UserRole::Administrator);
    assert_eq!(by_id.credential_hash, alice.credential_hash);

    let by_name = repos.users.find_user_by_name("alice").await.unwrap().unwrap();
    assert_eq!(by_name.id, alice.id);

    assert!(repos.users.find_user(UserId::new()).await.unwrap().is_none());
    assert!(repos.users.find_user_by_name("bob").await.unwrap().is_none());
}

#[tokio::test]
async fn test_user_names_unique_ignoring_case() {
    let repos = repositories().await;
    repos
        .users
        .insert_user(profile("alice", UserRole::Administrator))
        .await
        .unwrap();

    let err = repos
        .users
        .insert_user(profile("ALICE", UserRole::Member))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Conflict(_)), "got {err:?}");
    assert_eq!(repos.users.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn test_list_users_oldest_first() {
    let repos = repositories().await;
    let mut first = profile("first", UserRole::Administrator);
    first.created_at = Utc::now() - chrono::Duration::minutes(5);
    let second = profile("second", UserRole::Member);

    repos.users.insert_user(second.clone()).await.unwrap();
    repos.users.insert_user(first.clone()).await.unwrap();

    let users = repos.users.list_users().await.unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);
    assert_eq!(repos.users.count_users().await.unwrap(), 2);
}

#[tokio::test]
async fn test_site_settings_upsert() {
    let repos = repositories().await;

    assert_eq!(repos.site.load_site().await.unwrap(), SiteSettings::default());

    repos
        .site
        .save_site(SiteSettings {
            site_name: Some("RP Bank".to_string()),
        })
        .await
        .unwrap();
    repos
        .site
        .save_site(SiteSettings {
            site_name: Some("RP Bank Central".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(
        repos.site.load_site().await.unwrap().site_name.as_deref(),
        Some("RP Bank Central")
    );
}
