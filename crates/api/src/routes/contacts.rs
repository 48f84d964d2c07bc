//! The caller's contact book.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rpbank_core::directory::{Contact, NewContact};

use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the contact routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/contacts", get(list_contacts).post(add_contact))
}

/// GET /contacts
async fn list_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Contact>>, ApiError> {
    Ok(Json(state.directory.list_contacts(auth.user_id()).await?))
}

/// POST /contacts
async fn add_contact(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<NewContact>,
) -> Result<impl IntoResponse, ApiError> {
    let contact = state.directory.add_contact(auth.user_id(), payload).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}
