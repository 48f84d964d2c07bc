//! Demo data seeder for RP Bank development and testing.
//!
//! Registers an administrator, names the site, opens a handful of accounts
//! and runs a transfer, all through the same services the API uses.
//!
//! Usage: cargo run --bin seeder
//!
//! `SEED_ADMIN_PASSWORD` overrides the administrator password.

use std::sync::Arc;

use anyhow::{Context, bail};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rpbank_core::directory::{DirectoryService, NewContact};
use rpbank_core::ledger::{AccountKind, Destination, LedgerConfig, LedgerEngine, TransferRequest};
use rpbank_core::registry::{RegistryService, SiteService};
use rpbank_core::store::UserRegistryStore;
use rpbank_db::{Repositories, connect, migrate};
use rpbank_shared::AppConfig;

const ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin-password";
const SITE_NAME: &str = "RP Bank";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rpbank=info,seeder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    if config.database.is_in_memory() {
        bail!("Seeding needs a database; set RPBANK__DATABASE__URL");
    }

    let db = connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    migrate(&db).await.context("Failed to run migrations")?;
    let repos = Repositories::new(&db);

    if repos.users.count_users().await? > 0 {
        info!("Users already exist, skipping seed");
        return Ok(());
    }

    let registry = RegistryService::new(Arc::new(repos.users.clone()));
    let site = SiteService::new(Arc::new(repos.site.clone()));
    let directory = DirectoryService::new(Arc::new(repos.contacts.clone()));
    let ledger = LedgerEngine::new(
        Arc::new(repos.accounts.clone()),
        LedgerConfig::from(&config.bank),
    );

    let password =
        std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());
    let admin = registry
        .register(ADMIN_USERNAME, Some("Administrator"), &password)
        .await?;
    let actor = admin.actor();
    info!(user_id = %admin.id, "Seeded administrator");

    site.configure(actor, SITE_NAME).await?;
    info!(site_name = SITE_NAME, "Seeded site settings");

    let checking = ledger
        .open_account(admin.id, "Checking", AccountKind::Personal)
        .await?;
    let savings = ledger
        .open_account(admin.id, "Savings", AccountKind::Personal)
        .await?;
    let business = ledger
        .open_account(admin.id, "Storefront", AccountKind::Business)
        .await?;
    ledger
        .open_account(admin.id, "Treasury", AccountKind::AdministrativeView)
        .await?;

    ledger
        .post_adjustment(
            actor,
            admin.id,
            checking.id,
            Decimal::new(100_000, 2),
            Some("Opening deposit".to_string()),
        )
        .await?;
    ledger
        .post_adjustment(actor, admin.id, business.id, Decimal::new(250_000, 2), None)
        .await?;

    ledger
        .transfer(
            admin.id,
            TransferRequest {
                from_account_id: checking.id,
                destination: Destination::ByNumber(savings.account_number.to_string()),
                amount: Decimal::new(25_000, 2),
                description: Some("Monthly savings".to_string()),
            },
        )
        .await?;

    directory
        .add_contact(
            admin.id,
            NewContact {
                name: "Landlord".to_string(),
                account_number: "DE89 3704 0044 0532 0130 00".to_string(),
                bank_label: Some("Sparkasse".to_string()),
            },
        )
        .await?;

    info!(
        accounts = ledger.list_accounts(admin.id, None).await?.len(),
        "Seeding complete"
    );
    Ok(())
}
