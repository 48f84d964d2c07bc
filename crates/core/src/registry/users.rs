use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use rpbank_shared::types::UserId;

use super::RegistryError;
use crate::auth::{Actor, UserRole, check_password_policy, hash_password, verify_password};
use crate::store::{StoreError, UserRegistryStore};

const MAX_USERNAME_LEN: usize = 64;

/// A registered user.
#[derive(Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Identity.
    pub id: UserId,
    /// Login name, unique ignoring case.
    pub username: String,
    /// Name shown in the interface.
    pub display_name: String,
    /// Argon2id PHC string.
    pub credential_hash: String,
    /// Site role.
    pub role: UserRole,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// The identity this user acts as.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

impl std::fmt::Debug for UserProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserProfile")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Registration, login and role lookups.
#[derive(Clone)]
pub struct RegistryService {
    store: Arc<dyn UserRegistryStore>,
    registration: Arc<Mutex<()>>,
}

impl std::fmt::Debug for RegistryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryService").finish_non_exhaustive()
    }
}

impl RegistryService {
    /// Creates a registry over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn UserRegistryStore>) -> Self {
        Self {
            store,
            registration: Arc::new(Mutex::new(())),
        }
    }

    /// Registers a user. The first user of the site becomes administrator.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidUsername`] for blank or overlong names
    /// - [`RegistryError::WeakPassword`] if the password is too short
    /// - [`RegistryError::UsernameTaken`] if the name is in use
    /// - [`RegistryError::Store`] if the store fails
    #[instrument(skip(self, password, display_name))]
    pub async fn register(
        &self,
        username: &str,
        display_name: Option<&str>,
        password: &str,
    ) -> Result<UserProfile, RegistryError> {
        let username = username.trim();
        if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
            return Err(RegistryError::InvalidUsername(username.to_string()));
        }
        check_password_policy(password)?;
        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(username)
            .to_string();
        let credential_hash = hash_password(password)?;

        // Held across the count and the insert so only one user can be first.
        let _guard = self.registration.lock().await;

        if self.store.find_user_by_name(username).await?.is_some() {
            return Err(RegistryError::UsernameTaken(username.to_string()));
        }
        let role = if self.store.count_users().await? == 0 {
            UserRole::Administrator
        } else {
            UserRole::Member
        };

        let profile = UserProfile {
            id: UserId::new(),
            username: username.to_string(),
            display_name,
            credential_hash,
            role,
            created_at: Utc::now(),
        };
        self.store
            .insert_user(profile.clone())
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => RegistryError::UsernameTaken(username.to_string()),
                other => other.into(),
            })?;

        info!(user_id = %profile.id, role = %profile.role, "User registered");
        Ok(profile)
    }

    /// Checks a username and password.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidCredentials`] for an unknown user or wrong password
    /// - [`RegistryError::Store`] if the store fails
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserProfile, RegistryError> {
        let Some(profile) = self.store.find_user_by_name(username.trim()).await? else {
            warn!("Login failed: unknown user");
            return Err(RegistryError::InvalidCredentials);
        };

        if !verify_password(password, &profile.credential_hash)? {
            warn!(user_id = %profile.id, "Login failed: wrong password");
            return Err(RegistryError::InvalidCredentials);
        }

        Ok(profile)
    }

    /// Fetches a user.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::UserNotFound`] if there is no such user
    /// - [`RegistryError::Store`] if the store fails
    pub async fn profile(&self, user_id: UserId) -> Result<UserProfile, RegistryError> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or(RegistryError::UserNotFound(user_id))
    }

    /// The user's current identity, with the role read from the registry.
    ///
    /// # Errors
    ///
    /// Same as [`Self::profile`].
    pub async fn actor_for(&self, user_id: UserId) -> Result<Actor, RegistryError> {
        Ok(self.profile(user_id).await?.actor())
    }

    /// Lists every user. Administrators only.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Unauthorized`] unless `actor` is an administrator
    /// - [`RegistryError::Store`] if the store fails
    pub async fn list_users(&self, actor: Actor) -> Result<Vec<UserProfile>, RegistryError> {
        if !actor.is_administrator() {
            return Err(RegistryError::Unauthorized {
                user_id: actor.user_id,
            });
        }
        Ok(self.store.list_users().await?)
    }
}
