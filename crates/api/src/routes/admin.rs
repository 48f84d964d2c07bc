//! Administrative views and overrides on any user's accounts.
//!
//! Every handler re-reads the caller's role from the registry.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use rpbank_core::ledger::{Account, BalanceDrift, Transaction};
use rpbank_shared::auth::UserInfo;
use rpbank_shared::types::{AccountId, TransactionId, UserId};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::auth::user_info;
use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the admin routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/{user_id}/accounts", get(list_user_accounts))
        .route("/admin/users/{user_id}/audit", get(audit_user))
        .route(
            "/admin/users/{user_id}/accounts/{account_id}",
            delete(delete_account),
        )
        .route(
            "/admin/users/{user_id}/accounts/{account_id}/balance",
            put(set_balance),
        )
        .route(
            "/admin/users/{user_id}/accounts/{account_id}/adjustments",
            post(post_adjustment),
        )
        .route(
            "/admin/users/{user_id}/accounts/{account_id}/reconcile",
            post(reconcile),
        )
        .route(
            "/admin/users/{user_id}/accounts/{account_id}/transactions/{transaction_id}",
            delete(delete_transaction),
        )
}

/// Request body for overwriting a balance.
#[derive(Debug, Deserialize)]
pub struct SetBalanceRequest {
    /// New recorded balance.
    pub balance: Decimal,
}

/// Request body for a ledger adjustment.
#[derive(Debug, Deserialize)]
pub struct AdjustmentRequest {
    /// Signed, non-zero amount.
    pub amount: Decimal,
    /// Defaults to "Balance adjustment".
    #[serde(default)]
    pub description: Option<String>,
}

/// GET /admin/users
async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<UserInfo>>, ApiError> {
    let actor = auth.administrator(&state).await?;
    let users = state.registry.list_users(actor).await?;
    Ok(Json(users.iter().map(user_info).collect()))
}

/// GET /admin/users/{user_id}/accounts
async fn list_user_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Account>>, ApiError> {
    auth.administrator(&state).await?;
    Ok(Json(state.ledger.list_accounts(user_id, None).await?))
}

/// GET /admin/users/{user_id}/audit - Accounts whose balance drifted from the log.
async fn audit_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<BalanceDrift>>, ApiError> {
    auth.administrator(&state).await?;
    Ok(Json(state.ledger.audit(user_id).await?))
}

/// PUT /admin/users/{user_id}/accounts/{account_id}/balance
async fn set_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, account_id)): Path<(UserId, AccountId)>,
    Json(payload): Json<SetBalanceRequest>,
) -> Result<Json<Account>, ApiError> {
    let actor = auth.administrator(&state).await?;
    let account = state
        .ledger
        .set_balance(actor, user_id, account_id, payload.balance)
        .await?;
    Ok(Json(account))
}

/// POST /admin/users/{user_id}/accounts/{account_id}/adjustments
async fn post_adjustment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, account_id)): Path<(UserId, AccountId)>,
    Json(payload): Json<AdjustmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = auth.administrator(&state).await?;
    let transaction = state
        .ledger
        .post_adjustment(actor, user_id, account_id, payload.amount, payload.description)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// POST /admin/users/{user_id}/accounts/{account_id}/reconcile
async fn reconcile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, account_id)): Path<(UserId, AccountId)>,
) -> Result<Json<BalanceDrift>, ApiError> {
    let actor = auth.administrator(&state).await?;
    Ok(Json(state.ledger.reconcile(actor, user_id, account_id).await?))
}

/// DELETE /admin/users/{user_id}/accounts/{account_id}
async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, account_id)): Path<(UserId, AccountId)>,
) -> Result<Json<Account>, ApiError> {
    let actor = auth.administrator(&state).await?;
    let account = state.ledger.delete_account(actor, user_id, account_id).await?;
    info!(admin = %actor.user_id, %user_id, %account_id, "Account deleted via API");
    Ok(Json(account))
}

/// DELETE /admin/users/{user_id}/accounts/{account_id}/transactions/{transaction_id}
async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, account_id, transaction_id)): Path<(UserId, AccountId, String)>,
) -> Result<Json<Transaction>, ApiError> {
    let actor = auth.administrator(&state).await?;
    let transaction = state
        .ledger
        .delete_transaction(
            actor,
            user_id,
            account_id,
            &TransactionId::from_raw(transaction_id),
        )
        .await?;
    Ok(Json(transaction))
}
