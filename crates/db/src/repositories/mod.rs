//! Repository abstractions for data access.
//!
//! Each repository implements one storage port from `rpbank_core::store`,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account_set;
pub mod contact_book;
pub mod site_settings;
pub mod user;

pub use account_set::AccountSetRepository;
pub use contact_book::ContactBookRepository;
pub use site_settings::SiteSettingsRepository;
pub use user::UserRepository;

use rpbank_core::store::StoreError;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Maps a database error onto the storage port error.
pub(crate) fn store_error(err: DbErr) -> StoreError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return StoreError::Conflict(detail);
    }
    match err {
        DbErr::Json(detail) | DbErr::Type(detail) => StoreError::Corrupt(detail),
        other => StoreError::Unavailable(other.to_string()),
    }
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Corrupt(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Corrupt(e.to_string()))
}
