use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use super::RegistryError;
use crate::auth::Actor;
use crate::store::SiteSettingsStore;

/// Global site configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    /// Name shown in the header. `None` until setup runs.
    pub site_name: Option<String>,
}

impl SiteSettings {
    /// Returns true once a site name has been set.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.site_name.is_some()
    }
}

/// One-time site setup.
#[derive(Clone)]
pub struct SiteService {
    store: Arc<dyn SiteSettingsStore>,
    setup: Arc<Mutex<()>>,
}

impl std::fmt::Debug for SiteService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteService").finish_non_exhaustive()
    }
}

impl SiteService {
    /// Creates the service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn SiteSettingsStore>) -> Self {
        Self {
            store,
            setup: Arc::new(Mutex::new(())),
        }
    }

    /// Current settings.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] if the store fails.
    pub async fn settings(&self) -> Result<SiteSettings, RegistryError> {
        Ok(self.store.load_site().await?)
    }

    /// Returns true while the site has no name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] if the store fails.
    pub async fn needs_setup(&self) -> Result<bool, RegistryError> {
        Ok(!self.settings().await?.is_configured())
    }

    /// Sets the site name. Runs once, administrators only.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Unauthorized`] unless `actor` is an administrator
    /// - [`RegistryError::InvalidSiteName`] for a blank name
    /// - [`RegistryError::AlreadyConfigured`] if setup already ran
    /// - [`RegistryError::Store`] if the store fails
    #[instrument(skip_all, fields(actor = %actor.user_id))]
    pub async fn configure(
        &self,
        actor: Actor,
        site_name: &str,
    ) -> Result<SiteSettings, RegistryError> {
        if !actor.is_administrator() {
            return Err(RegistryError::Unauthorized {
                user_id: actor.user_id,
            });
        }
        let site_name = site_name.trim();
        if site_name.is_empty() {
            return Err(RegistryError::InvalidSiteName);
        }

        let _guard = self.setup.lock().await;
        if self.store.load_site().await?.is_configured() {
            return Err(RegistryError::AlreadyConfigured);
        }

        let settings = SiteSettings {
            site_name: Some(site_name.to_string()),
        };
        self.store.save_site(settings.clone()).await?;

        info!(site_name, "Site configured");
        Ok(settings)
    }
}
