//! Site name and first-run setup.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};
use rpbank_core::registry::SiteSettings;
use serde::{Deserialize, Serialize};

use crate::{ApiError, AppState, middleware::AuthUser};

/// Routes readable without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/site", get(get_site))
}

/// Routes that require a token.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/site", put(configure_site))
}

/// Request body for site setup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureSiteRequest {
    /// Name shown in the header.
    pub site_name: String,
}

/// Site settings as shown to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteResponse {
    /// Configured name, if any.
    pub site_name: Option<String>,
    /// True until an administrator names the site.
    pub needs_setup: bool,
}

impl From<SiteSettings> for SiteResponse {
    fn from(settings: SiteSettings) -> Self {
        Self {
            needs_setup: !settings.is_configured(),
            site_name: settings.site_name,
        }
    }
}

/// GET /site
async fn get_site(State(state): State<AppState>) -> Result<Json<SiteResponse>, ApiError> {
    Ok(Json(state.site.settings().await?.into()))
}

/// PUT /site - One-time setup, administrators only.
async fn configure_site(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ConfigureSiteRequest>,
) -> Result<Json<SiteResponse>, ApiError> {
    let actor = auth.administrator(&state).await?;
    let settings = state.site.configure(actor, &payload.site_name).await?;
    Ok(Json(settings.into()))
}
