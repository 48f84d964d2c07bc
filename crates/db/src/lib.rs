//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repositories implementing the `rpbank_core::store` ports
//! - Database migrations (PostgreSQL and SQLite)

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountSetRepository, ContactBookRepository, SiteSettingsRepository, UserRepository,
};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use migration::Migrator;

/// Establishes a connection to the database.
///
/// In-memory SQLite URLs get a single pooled connection: each extra
/// connection would open its own empty database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options.sqlx_logging(false);
    if is_in_memory_sqlite(database_url) {
        options.max_connections(1).min_connections(1);
    }
    Database::connect(options).await
}

/// Applies every pending migration.
///
/// # Errors
///
/// Returns an error if a migration fails.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await?;
    info!("Database migrations applied");
    Ok(())
}

fn is_in_memory_sqlite(url: &str) -> bool {
    url.starts_with("sqlite::memory:") || (url.starts_with("sqlite:") && url.contains("mode=memory"))
}

/// One repository per storage port, sharing a connection pool.
#[derive(Debug, Clone)]
pub struct Repositories {
    /// Account collections.
    pub accounts: AccountSetRepository,
    /// Contact books.
    pub contacts: ContactBookRepository,
    /// User registry.
    pub users: UserRepository,
    /// Site settings.
    pub site: SiteSettingsRepository,
}

impl Repositories {
    /// Builds every repository over `db`.
    #[must_use]
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            accounts: AccountSetRepository::new(db.clone()),
            contacts: ContactBookRepository::new(db.clone()),
            users: UserRepository::new(db.clone()),
            site: SiteSettingsRepository::new(db.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::is_in_memory_sqlite;

    #[test]
    fn test_in_memory_sqlite_detection() {
        assert!(is_in_memory_sqlite("sqlite::memory:"));
        assert!(is_in_memory_sqlite("sqlite:file:bank?mode=memory&cache=shared"));
        assert!(!is_in_memory_sqlite("sqlite://rpbank.db?mode=rwc"));
        assert!(!is_in_memory_sqlite("postgres://localhost/rpbank"));
    }
}
