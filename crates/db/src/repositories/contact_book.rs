//! Contact books, one JSON document per user.

use async_trait::async_trait;
use chrono::Utc;
use rpbank_core::directory::Contact;
use rpbank_core::store::{ContactStore, StoreError};
use rpbank_shared::types::UserId;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use super::{decode, encode, store_error};
use crate::entities::contact_books;

/// Contact store backed by the `contact_books` table.
#[derive(Debug, Clone)]
pub struct ContactBookRepository {
    db: DatabaseConnection,
}

impl ContactBookRepository {
    /// Creates a new contact book repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContactStore for ContactBookRepository {
    async fn load_contacts(&self, user_id: UserId) -> Result<Vec<Contact>, StoreError> {
        contact_books::Entity::find_by_id(user_id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map_or_else(|| Ok(Vec::new()), |row| decode(&row.contacts))
    }

    async fn save_contacts(
        &self,
        user_id: UserId,
        contacts: Vec<Contact>,
    ) -> Result<(), StoreError> {
        let row = contact_books::ActiveModel {
            user_id: Set(user_id.into_inner()),
            contacts: Set(encode(&contacts)?),
            updated_at: Set(Utc::now()),
        };

        contact_books::Entity::insert(row)
            .on_conflict(
                OnConflict::column(contact_books::Column::UserId)
                    .update_columns([
                        contact_books::Column::Contacts,
                        contact_books::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(store_error)?;

        Ok(())
    }
}
