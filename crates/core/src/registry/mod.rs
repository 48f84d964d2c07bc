//! User registry and site settings.
//!
//! Holds who may log in, what role they have, and the one-time site setup.

mod site;
mod users;

pub use site::{SiteService, SiteSettings};
pub use users::{RegistryService, UserProfile};

use thiserror::Error;
use rpbank_shared::types::UserId;

use crate::auth::PasswordError;
use crate::store::StoreError;

/// Errors raised by the registry and site services.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Username is blank or too long.
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// Username already registered.
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    /// Password rejected by the password policy.
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// Unknown username or wrong password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No such user.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Caller lacks the administrator role.
    #[error("User {user_id} is not an administrator")]
    Unauthorized {
        /// The acting user.
        user_id: UserId,
    },

    /// Site name is blank.
    #[error("Site name cannot be blank")]
    InvalidSiteName,

    /// Site setup already ran.
    #[error("Site is already configured")]
    AlreadyConfigured,

    /// Hashing failed.
    #[error("Credential error: {0}")]
    Credential(String),

    /// The backing store failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<PasswordError> for RegistryError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort => Self::WeakPassword(err.to_string()),
            other => Self::Credential(other.to_string()),
        }
    }
}

impl RegistryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidUsername(_) | Self::WeakPassword(_) | Self::InvalidSiteName => {
                "VALIDATION_ERROR"
            }
            Self::UsernameTaken(_) => "USERNAME_TAKEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::Unauthorized { .. } => "FORBIDDEN",
            Self::AlreadyConfigured => "ALREADY_CONFIGURED",
            Self::Credential(_) => "INTERNAL_ERROR",
            Self::Store(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidUsername(_) | Self::WeakPassword(_) | Self::InvalidSiteName => 400,
            Self::InvalidCredentials => 401,
            Self::Unauthorized { .. } => 403,
            Self::UserNotFound(_) => 404,
            Self::UsernameTaken(_) | Self::AlreadyConfigured => 409,
            Self::Credential(_) | Self::Store(_) => 500,
        }
    }
}
