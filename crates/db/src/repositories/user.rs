//! User repository for the registry.

use async_trait::async_trait;
use rpbank_core::auth::UserRole;
use rpbank_core::registry::UserProfile;
use rpbank_core::store::{StoreError, UserRegistryStore};
use rpbank_shared::types::UserId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use super::store_error;
use crate::entities::users;

/// Registry store backed by the `users` table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_profile(row: users::Model) -> Result<UserProfile, StoreError> {
    let role: UserRole = row.role.parse().map_err(StoreError::Corrupt)?;

    Ok(UserProfile {
        id: UserId::from_uuid(row.id),
        username: row.username,
        display_name: row.display_name,
        credential_hash: row.credential_hash,
        role,
        created_at: row.created_at,
    })
}

#[async_trait]
impl UserRegistryStore for UserRepository {
    async fn find_user(&self, user_id: UserId) -> Result<Option<UserProfile>, StoreError> {
        users::Entity::find_by_id(user_id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(to_profile)
            .transpose()
    }

    async fn find_user_by_name(&self, username: &str) -> Result<Option<UserProfile>, StoreError> {
        users::Entity::find()
            .filter(users::Column::UsernameKey.eq(username.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(to_profile)
            .transpose()
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>, StoreError> {
        users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(to_profile)
            .collect()
    }

    async fn insert_user(&self, profile: UserProfile) -> Result<(), StoreError> {
        let row = users::ActiveModel {
            id: Set(profile.id.into_inner()),
            username_key: Set(profile.username.to_lowercase()),
            username: Set(profile.username),
            display_name: Set(profile.display_name),
            credential_hash: Set(profile.credential_hash),
            role: Set(profile.role.to_string()),
            created_at: Set(profile.created_at),
        };

        let row = row.insert(&self.db).await.map_err(store_error)?;
        info!(user_id = %row.id, role = %row.role, "User inserted");
        Ok(())
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        users::Entity::find()
            .count(&self.db)
            .await
            .map_err(store_error)
    }
}
