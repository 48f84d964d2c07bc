//! Storage ports.
//!
//! Collections are read and written whole: `save` replaces everything stored
//! for a user in one write. Callers that need atomic read-modify-write
//! sequences serialize them per user (see [`crate::ledger::UserLocks`]).

mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use thiserror::Error;
use rpbank_shared::types::UserId;

use crate::directory::Contact;
use crate::ledger::Account;
use crate::registry::{SiteSettings, UserProfile};

/// Errors raised by a storage adapter.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing store could not be reached or failed mid-operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Stored data could not be decoded.
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Per-user account collections.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Loads a user's accounts. Unknown users have none.
    async fn load(&self, user_id: UserId) -> Result<Vec<Account>, StoreError>;

    /// Replaces a user's accounts.
    async fn save(&self, user_id: UserId, accounts: Vec<Account>) -> Result<(), StoreError>;
}

/// Per-user contact books.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Loads a user's contacts. Unknown users have none.
    async fn load_contacts(&self, user_id: UserId) -> Result<Vec<Contact>, StoreError>;

    /// Replaces a user's contacts.
    async fn save_contacts(&self, user_id: UserId, contacts: Vec<Contact>)
    -> Result<(), StoreError>;
}

/// Registered users.
#[async_trait]
pub trait UserRegistryStore: Send + Sync {
    /// Looks a user up by id.
    async fn find_user(&self, user_id: UserId) -> Result<Option<UserProfile>, StoreError>;

    /// Looks a user up by username, ignoring case.
    async fn find_user_by_name(&self, username: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Lists every user, oldest first.
    async fn list_users(&self) -> Result<Vec<UserProfile>, StoreError>;

    /// Inserts a new user.
    ///
    /// Fails with [`StoreError::Conflict`] if the id or username is taken.
    async fn insert_user(&self, profile: UserProfile) -> Result<(), StoreError>;

    /// Number of registered users.
    async fn count_users(&self) -> Result<u64, StoreError>;
}

/// The global site configuration record.
#[async_trait]
pub trait SiteSettingsStore: Send + Sync {
    /// Loads the settings; an unconfigured site has default settings.
    async fn load_site(&self) -> Result<SiteSettings, StoreError>;

    /// Replaces the settings.
    async fn save_site(&self, settings: SiteSettings) -> Result<(), StoreError>;
}
