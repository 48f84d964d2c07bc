//! Site configuration record.

use async_trait::async_trait;
use chrono::Utc;
use rpbank_core::registry::SiteSettings;
use rpbank_core::store::{SiteSettingsStore, StoreError};
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use super::store_error;
use crate::entities::site_settings::{self, SINGLETON_ID};

/// Site settings store backed by the single-row `site_settings` table.
#[derive(Debug, Clone)]
pub struct SiteSettingsRepository {
    db: DatabaseConnection,
}

impl SiteSettingsRepository {
    /// Creates a new site settings repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SiteSettingsStore for SiteSettingsRepository {
    async fn load_site(&self) -> Result<SiteSettings, StoreError> {
        let row = site_settings::Entity::find_by_id(SINGLETON_ID)
            .one(&self.db)
            .await
            .map_err(store_error)?;

        Ok(SiteSettings {
            site_name: row.and_then(|row| row.site_name),
        })
    }

    async fn save_site(&self, settings: SiteSettings) -> Result<(), StoreError> {
        let row = site_settings::ActiveModel {
            id: Set(SINGLETON_ID),
            site_name: Set(settings.site_name),
            updated_at: Set(Utc::now()),
        };

        site_settings::Entity::insert(row)
            .on_conflict(
                OnConflict::column(site_settings::Column::Id)
                    .update_columns([
                        site_settings::Column::SiteName,
                        site_settings::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(store_error)?;

        Ok(())
    }
}
