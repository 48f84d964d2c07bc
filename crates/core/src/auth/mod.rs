//! Roles, acting identities and password hashing.
//!
//! The ledger engine enforces administrative permissions itself: privileged
//! operations take an [`Actor`] and check its role before touching storage.

mod password;

pub use password::{
    MIN_PASSWORD_LEN, PasswordError, check_password_policy, hash_password, verify_password,
};

use serde::{Deserialize, Serialize};
use rpbank_shared::types::UserId;

/// Site-wide user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// May run administrative corrections and configure the site.
    Administrator,
    /// Regular account holder.
    Member,
}

impl UserRole {
    /// Returns true for administrators.
    #[must_use]
    pub const fn is_administrator(self) -> bool {
        matches!(self, Self::Administrator)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Administrator => write!(f, "administrator"),
            Self::Member => write!(f, "member"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "administrator" | "admin" => Ok(Self::Administrator),
            "member" | "user" => Ok(Self::Member),
            _ => Err(format!("Invalid role: {s}")),
        }
    }
}

/// The identity on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// The acting user.
    pub user_id: UserId,
    /// Role as read from the registry.
    pub role: UserRole,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Returns true if the actor may run administrative operations.
    #[must_use]
    pub const fn is_administrator(&self) -> bool {
        self.role.is_administrator()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("administrator".parse::<UserRole>().unwrap(), UserRole::Administrator);
        assert_eq!("Admin".parse::<UserRole>().unwrap(), UserRole::Administrator);
        assert_eq!("member".parse::<UserRole>().unwrap(), UserRole::Member);
        assert!("owner".parse::<UserRole>().is_err());

        assert_eq!(UserRole::Administrator.to_string(), "administrator");
        assert_eq!(
            UserRole::Member.to_string().parse::<UserRole>().unwrap(),
            UserRole::Member
        );
    }

    #[test]
    fn test_actor_permissions() {
        let user = UserId::new();
        assert!(Actor::new(user, UserRole::Administrator).is_administrator());
        assert!(!Actor::new(user, UserRole::Member).is_administrator());
    }
}
