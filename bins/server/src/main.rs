//! RP Bank API Server
//!
//! Main entry point for the RP Bank backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rpbank_api::{AppState, create_router};
use rpbank_core::directory::DirectoryService;
use rpbank_core::ledger::{LedgerConfig, LedgerEngine};
use rpbank_core::registry::{RegistryService, SiteService};
use rpbank_db::{Repositories, connect, migrate};
use rpbank_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rpbank=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let ledger_config = LedgerConfig::from(&config.bank);
    let jwt_service = JwtService::new(JwtConfig::from(&config.jwt));
    info!(
        currency = ?ledger_config.currency,
        allow_external_transfers = ledger_config.allow_external_transfers,
        "Ledger configured"
    );

    let state = if config.database.is_in_memory() {
        warn!("Using in-memory storage; data is lost on shutdown");
        AppState::in_memory(ledger_config, jwt_service)
    } else {
        let db = connect(&config.database.url)
            .await
            .context("Failed to connect to database")?;
        info!("Connected to database");

        if config.database.run_migrations {
            migrate(&db).await.context("Failed to run migrations")?;
        }

        let repos = Repositories::new(&db);
        AppState {
            ledger: LedgerEngine::new(Arc::new(repos.accounts), ledger_config),
            directory: DirectoryService::new(Arc::new(repos.contacts)),
            registry: RegistryService::new(Arc::new(repos.users)),
            site: SiteService::new(Arc::new(repos.site)),
            jwt_service: Arc::new(jwt_service),
        }
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
