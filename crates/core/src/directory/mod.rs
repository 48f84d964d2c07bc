//! Per-user address book of external accounts.
//!
//! Contacts only exist to pre-fill a transfer destination: a contact resolves
//! to [`Destination::ByNumber`] and the ledger engine takes it from there.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};
use rpbank_shared::types::{ContactId, UserId};

use crate::ledger::{Destination, UserLocks};
use crate::store::{ContactStore, StoreError};

/// Bank label used when a contact is added without one.
pub const DEFAULT_BANK_LABEL: &str = "External bank";

/// A named reference to an account, usually held at another bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Identity within the user's book.
    pub id: ContactId,
    /// Who the account belongs to.
    pub name: String,
    /// Opaque account reference, passed to transfers as is.
    pub account_number: String,
    /// Bank the account is held at.
    pub bank_label: String,
}

/// Input for [`DirectoryService::add_contact`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    /// Required.
    pub name: String,
    /// Required.
    pub account_number: String,
    /// Defaults to [`DEFAULT_BANK_LABEL`].
    #[serde(default)]
    pub bank_label: Option<String>,
}

/// Errors raised by the directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A required field is blank.
    #[error("Contact field '{0}' is required")]
    MissingField(&'static str),

    /// No such contact in the user's book.
    #[error("Contact not found: {0}")]
    ContactNotFound(ContactId),

    /// The contact store failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl DirectoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "VALIDATION_ERROR",
            Self::ContactNotFound(_) => "CONTACT_NOT_FOUND",
            Self::Store(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::MissingField(_) => 400,
            Self::ContactNotFound(_) => 404,
            Self::Store(_) => 500,
        }
    }
}

/// Reads and appends to contact books.
#[derive(Clone)]
pub struct DirectoryService {
    store: Arc<dyn ContactStore>,
    locks: UserLocks,
}

impl std::fmt::Debug for DirectoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryService").finish_non_exhaustive()
    }
}

impl DirectoryService {
    /// Creates a directory over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self {
            store,
            locks: UserLocks::new(),
        }
    }

    /// Lists a user's contacts in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Store`] if the store fails.
    pub async fn list_contacts(&self, user_id: UserId) -> Result<Vec<Contact>, DirectoryError> {
        Ok(self.store.load_contacts(user_id).await?)
    }

    /// Adds a contact under a fresh id.
    ///
    /// # Errors
    ///
    /// - [`DirectoryError::MissingField`] if the name or number is blank
    /// - [`DirectoryError::Store`] if the store fails
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn add_contact(
        &self,
        user_id: UserId,
        input: NewContact,
    ) -> Result<Contact, DirectoryError> {
        let name = required(&input.name, "name")?;
        let account_number = required(&input.account_number, "accountNumber")?;
        let bank_label = input
            .bank_label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .unwrap_or(DEFAULT_BANK_LABEL)
            .to_string();

        let contact = Contact {
            id: ContactId::new(),
            name,
            account_number,
            bank_label,
        };

        let _guard = self.locks.acquire(user_id).await;
        let mut contacts = self.store.load_contacts(user_id).await?;
        contacts.push(contact.clone());
        self.store.save_contacts(user_id, contacts).await?;

        info!(contact_id = %contact.id, "Contact added");
        Ok(contact)
    }

    /// Fetches one contact.
    ///
    /// # Errors
    ///
    /// - [`DirectoryError::ContactNotFound`] if the book has no such contact
    /// - [`DirectoryError::Store`] if the store fails
    pub async fn find_contact(
        &self,
        user_id: UserId,
        contact_id: ContactId,
    ) -> Result<Contact, DirectoryError> {
        self.store
            .load_contacts(user_id)
            .await?
            .into_iter()
            .find(|contact| contact.id == contact_id)
            .ok_or(DirectoryError::ContactNotFound(contact_id))
    }

    /// Turns a contact into a transfer destination.
    ///
    /// # Errors
    ///
    /// Same as [`Self::find_contact`].
    pub async fn destination_for(
        &self,
        user_id: UserId,
        contact_id: ContactId,
    ) -> Result<Destination, DirectoryError> {
        let contact = self.find_contact(user_id, contact_id).await?;
        Ok(Destination::ByNumber(contact.account_number))
    }
}

fn required(value: &str, field: &'static str) -> Result<String, DirectoryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DirectoryError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn service() -> DirectoryService {
        DirectoryService::new(Arc::new(InMemoryStore::new()))
    }

    fn input(name: &str, number: &str, bank: Option<&str>) -> NewContact {
        NewContact {
            name: name.to_string(),
            account_number: number.to_string(),
            bank_label: bank.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_add_and_list_contacts() {
        let directory = service();
        let user = UserId::new();

        let first = directory
            .add_contact(user, input("  Landlord ", "FR76 1234", Some("Crédit Local")))
            .await
            .unwrap();
        let second = directory
            .add_contact(user, input("Plumber", "9876 5432 1098 7654", None))
            .await
            .unwrap();

        assert_eq!(first.name, "Landlord");
        assert_eq!(first.bank_label, "Crédit Local");
        assert_eq!(second.bank_label, DEFAULT_BANK_LABEL);
        assert_ne!(first.id, second.id);

        let listed = directory.list_contacts(user).await.unwrap();
        assert_eq!(listed, vec![first, second]);
        assert!(directory.list_contacts(UserId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_required_fields() {
        let directory = service();
        let user = UserId::new();

        let err = directory
            .add_contact(user, input(" ", "1234", None))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::MissingField("name")));

        let err = directory
            .add_contact(user, input("Bob", "", None))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::MissingField("accountNumber")));
        assert_eq!(err.http_status_code(), 400);

        assert!(directory.list_contacts(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_destination_for_contact() {
        let directory = service();
        let user = UserId::new();
        let contact = directory
            .add_contact(user, input("Bob", "1111 2222 3333 4444", None))
            .await
            .unwrap();

        let destination = directory.destination_for(user, contact.id).await.unwrap();
        assert_eq!(destination, Destination::ByNumber("1111 2222 3333 4444".into()));

        // Contacts are private to their owner.
        let err = directory
            .destination_for(UserId::new(), contact.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::ContactNotFound(_)));
    }
}
