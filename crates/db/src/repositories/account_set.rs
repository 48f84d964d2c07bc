//! Account collections, one JSON document per user.

use async_trait::async_trait;
use chrono::Utc;
use rpbank_core::ledger::Account;
use rpbank_core::store::{AccountStore, StoreError};
use rpbank_shared::types::UserId;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use tracing::debug;

use super::{decode, encode, store_error};
use crate::entities::account_sets;

/// Account store backed by the `account_sets` table.
#[derive(Debug, Clone)]
pub struct AccountSetRepository {
    db: DatabaseConnection,
}

impl AccountSetRepository {
    /// Creates a new account set repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for AccountSetRepository {
    async fn load(&self, user_id: UserId) -> Result<Vec<Account>, StoreError> {
        let row = account_sets::Entity::find_by_id(user_id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_error)?;

        match row {
            Some(row) => decode(&row.accounts),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, user_id: UserId, accounts: Vec<Account>) -> Result<(), StoreError> {
        let row = account_sets::ActiveModel {
            user_id: Set(user_id.into_inner()),
            accounts: Set(encode(&accounts)?),
            updated_at: Set(Utc::now()),
        };

        account_sets::Entity::insert(row)
            .on_conflict(
                OnConflict::column(account_sets::Column::UserId)
                    .update_columns([
                        account_sets::Column::Accounts,
                        account_sets::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(store_error)?;

        debug!(%user_id, accounts = accounts.len(), "Account set saved");
        Ok(())
    }
}
