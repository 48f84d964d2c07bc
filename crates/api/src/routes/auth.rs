//! Registration and login.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use rpbank_core::registry::UserProfile;
use rpbank_shared::auth::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};
use tracing::info;

use crate::{ApiError, AppState};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}

/// Public view of a registered user.
pub(crate) fn user_info(profile: &UserProfile) -> UserInfo {
    UserInfo {
        id: profile.id,
        username: profile.username.clone(),
        display_name: profile.display_name.clone(),
        role: profile.role.to_string(),
    }
}

fn issue_token(state: &AppState, profile: &UserProfile) -> Result<LoginResponse, ApiError> {
    let access_token = state.jwt_service.generate_access_token(
        profile.id,
        &profile.display_name,
        &profile.role.to_string(),
    )?;

    Ok(LoginResponse {
        user: user_info(profile),
        access_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    })
}

/// POST /auth/register - Register a user and log them in.
///
/// The first user of the site becomes its administrator.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .registry
        .register(
            &payload.username,
            payload.display_name.as_deref(),
            &payload.password,
        )
        .await?;

    let response = issue_token(&state, &profile)?;
    info!(user_id = %profile.id, "User registered via API");

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/login - Authenticate and return an access token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .registry
        .authenticate(&payload.username, &payload.password)
        .await?;

    let response = issue_token(&state, &profile)?;
    info!(user_id = %profile.id, "User logged in successfully");

    Ok(Json(response))
}
