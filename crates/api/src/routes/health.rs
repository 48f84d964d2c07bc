//! Liveness and storage reachability.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `healthy`, or `unavailable` when the site store cannot be read.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Configured bank name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    /// True until an administrator names the site. Absent when unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_setup: Option<bool>,
}

/// GET /health
///
/// Reads the site settings so a broken store shows up as `503`.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let version = env!("CARGO_PKG_VERSION");
    match state.site.settings().await {
        Ok(settings) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                version,
                needs_setup: Some(!settings.is_configured()),
                site_name: settings.site_name,
            }),
        ),
        Err(e) => {
            warn!(error = %e, "Health check could not read site settings");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    version,
                    site_name: None,
                    needs_setup: None,
                }),
            )
        }
    }
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
