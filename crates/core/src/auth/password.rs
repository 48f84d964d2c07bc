//! Credential hashing with Argon2id.
//!
//! Stored credentials are PHC strings (`$argon2id$v=19$...`), each with its own
//! random salt.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Errors raised while handling credentials.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The password does not meet the length requirement.
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    TooShort,

    /// Argon2 failed to produce a hash.
    #[error("failed to hash password: {0}")]
    HashError(String),

    /// Argon2 failed while comparing.
    #[error("failed to verify password: {0}")]
    VerifyError(String),

    /// The stored credential is not a PHC string.
    #[error("invalid password hash format")]
    InvalidHash,
}

/// Rejects passwords shorter than [`MIN_PASSWORD_LEN`] characters.
///
/// # Errors
///
/// Returns [`PasswordError::TooShort`].
pub fn check_password_policy(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort);
    }
    Ok(())
}

/// Hashes a password into a PHC string.
///
/// # Errors
///
/// Returns [`PasswordError::HashError`] if Argon2 fails.
///
/// # Example
///
/// ```
/// use rpbank_core::auth::hash_password;
///
/// let credential = hash_password("correct horse").unwrap();
/// assert!(credential.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Checks a password against a stored credential.
///
/// Returns `Ok(false)` on a mismatch; errors are reserved for malformed
/// credentials and internal failures.
///
/// # Errors
///
/// - [`PasswordError::InvalidHash`] if `credential` cannot be parsed
/// - [`PasswordError::VerifyError`] for any other Argon2 failure
///
/// # Example
///
/// ```
/// use rpbank_core::auth::{hash_password, verify_password};
///
/// let credential = hash_password("correct horse").unwrap();
/// assert!(verify_password("correct horse", &credential).unwrap());
/// assert!(!verify_password("battery staple", &credential).unwrap());
/// ```
pub fn verify_password(password: &str, credential: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(credential).map_err(|_| PasswordError::InvalidHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_phc_argon2id() {
        let credential = hash_password("s3cret-pass").unwrap();
        assert!(credential.starts_with("$argon2id$"));
        assert!(!credential.contains("s3cret-pass"));
    }

    #[test]
    fn test_verify_roundtrip() {
        let credential = hash_password("s3cret-pass").unwrap();
        assert!(verify_password("s3cret-pass", &credential).unwrap());
        assert!(!verify_password("S3cret-pass", &credential).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(
            hash_password("same-password").unwrap(),
            hash_password("same-password").unwrap()
        );
    }

    #[test]
    fn test_malformed_credential() {
        assert!(matches!(
            verify_password("anything", "plaintext"),
            Err(PasswordError::InvalidHash)
        ));
    }

    #[test]
    fn test_policy_counts_characters() {
        assert!(matches!(check_password_policy("short"), Err(PasswordError::TooShort)));
        assert!(check_password_policy("éééééééé").is_ok());
        assert!(check_password_policy("12345678").is_ok());
    }
}
