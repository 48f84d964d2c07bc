use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use rpbank_shared::types::UserId;

use super::{AccountStore, ContactStore, SiteSettingsStore, StoreError, UserRegistryStore};
use crate::directory::Contact;
use crate::ledger::Account;
use crate::registry::{SiteSettings, UserProfile};

/// Process-local store implementing every port.
///
/// Intended for tests and the `memory` database mode. Nothing survives a
/// restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    accounts: RwLock<HashMap<UserId, Vec<Account>>>,
    contacts: RwLock<HashMap<UserId, Vec<Contact>>>,
    users: RwLock<BTreeMap<UserId, UserProfile>>,
    site: RwLock<SiteSettings>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn load(&self, user_id: UserId) -> Result<Vec<Account>, StoreError> {
        let accounts = self.accounts.read().map_err(|_| poisoned())?;
        Ok(accounts.get(&user_id).cloned().unwrap_or_default())
    }

    async fn save(&self, user_id: UserId, accounts: Vec<Account>) -> Result<(), StoreError> {
        self.accounts
            .write()
            .map_err(|_| poisoned())?
            .insert(user_id, accounts);
        Ok(())
    }
}

#[async_trait]
impl ContactStore for InMemoryStore {
    async fn load_contacts(&self, user_id: UserId) -> Result<Vec<Contact>, StoreError> {
        let contacts = self.contacts.read().map_err(|_| poisoned())?;
        Ok(contacts.get(&user_id).cloned().unwrap_or_default())
    }

    async fn save_contacts(
        &self,
        user_id: UserId,
        contacts: Vec<Contact>,
    ) -> Result<(), StoreError> {
        self.contacts
            .write()
            .map_err(|_| poisoned())?
            .insert(user_id, contacts);
        Ok(())
    }
}

#[async_trait]
impl UserRegistryStore for InMemoryStore {
    async fn find_user(&self, user_id: UserId) -> Result<Option<UserProfile>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(&user_id).cloned())
    }

    async fn find_user_by_name(&self, username: &str) -> Result<Option<UserProfile>, StoreError> {
        let key = username.to_lowercase();
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users
            .values()
            .find(|user| user.username.to_lowercase() == key)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        let mut list: Vec<UserProfile> = users.values().cloned().collect();
        list.sort_by_key(|user| user.created_at);
        Ok(list)
    }

    async fn insert_user(&self, profile: UserProfile) -> Result<(), StoreError> {
        let key = profile.username.to_lowercase();
        let mut users = self.users.write().map_err(|_| poisoned())?;
        let taken = users.contains_key(&profile.id)
            || users
                .values()
                .any(|user| user.username.to_lowercase() == key);
        if taken {
            return Err(StoreError::Conflict(format!(
                "user {} already exists",
                profile.username
            )));
        }
        users.insert(profile.id, profile);
        Ok(())
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.len() as u64)
    }
}

#[async_trait]
impl SiteSettingsStore for InMemoryStore {
    async fn load_site(&self) -> Result<SiteSettings, StoreError> {
        Ok(self.site.read().map_err(|_| poisoned())?.clone())
    }

    async fn save_site(&self, settings: SiteSettings) -> Result<(), StoreError> {
        *self.site.write().map_err(|_| poisoned())? = settings;
        Ok(())
    }
}
