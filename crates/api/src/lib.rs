//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes over the ledger, directory and registry services
//! - Authentication middleware
//! - Request extractors
//! - Error responses

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use rpbank_core::directory::DirectoryService;
use rpbank_core::ledger::{LedgerConfig, LedgerEngine};
use rpbank_core::registry::{RegistryService, SiteService};
use rpbank_core::store::InMemoryStore;
use rpbank_shared::JwtService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Accounts, transfers and administrative edits.
    pub ledger: LedgerEngine,
    /// Contact books.
    pub directory: DirectoryService,
    /// Users and roles.
    pub registry: RegistryService,
    /// One-time site setup.
    pub site: SiteService,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    /// Wires every service to a single process-local store.
    #[must_use]
    pub fn in_memory(config: LedgerConfig, jwt_service: JwtService) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            ledger: LedgerEngine::new(store.clone(), config),
            directory: DirectoryService::new(store.clone()),
            registry: RegistryService::new(store.clone()),
            site: SiteService::new(store),
            jwt_service: Arc::new(jwt_service),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("ledger", &self.ledger)
            .field("jwt_service", &self.jwt_service)
            .finish_non_exhaustive()
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
