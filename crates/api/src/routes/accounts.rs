//! The caller's own accounts.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rpbank_core::ledger::{Account, AccountKind, AccountView, Transaction};
use rpbank_shared::types::{AccountId, Currency, PageRequest, PageResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the account routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(open_account))
        .route("/accounts/{account_id}", get(get_account).patch(rename_account))
        .route("/accounts/{account_id}/transactions", get(list_transactions))
}

/// Query parameters for listing accounts.
#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    /// Dashboard filter: `personal`, `business` or `admin`.
    pub view: Option<AccountView>,
}

/// Request body for opening an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAccountRequest {
    /// Name shown to the user.
    pub display_name: String,
    /// Defaults to `personal`.
    #[serde(default)]
    pub kind: Option<AccountKind>,
}

/// Request body for renaming an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameAccountRequest {
    /// New display name.
    pub display_name: String,
}

/// An account without its transaction log.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    /// Account ID.
    pub id: AccountId,
    /// Formatted account number.
    pub account_number: String,
    /// Display name.
    pub display_name: String,
    /// Recorded balance.
    pub balance: Decimal,
    /// Currency.
    pub currency: Currency,
    /// Display symbol of the currency.
    pub currency_symbol: &'static str,
    /// Balance rendered for display, e.g. `60.00 €`.
    pub formatted_balance: String,
    /// Account kind.
    pub kind: AccountKind,
    /// Number of transactions in the log.
    pub transaction_count: usize,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            account_number: account.account_number.to_string(),
            display_name: account.display_name.clone(),
            balance: account.balance,
            currency: account.currency,
            currency_symbol: account.currency.symbol(),
            formatted_balance: account.balance_money().to_string(),
            kind: account.kind,
            transaction_count: account.transactions.len(),
        }
    }
}

/// GET /accounts - List the caller's accounts.
async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<Vec<AccountSummary>>, ApiError> {
    let accounts = state.ledger.list_accounts(auth.user_id(), query.view).await?;
    Ok(Json(accounts.iter().map(AccountSummary::from).collect()))
}

/// POST /accounts - Open an empty account.
async fn open_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<OpenAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state
        .ledger
        .open_account(
            auth.user_id(),
            &payload.display_name,
            payload.kind.unwrap_or(AccountKind::Personal),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET /accounts/{account_id} - One account with its full log.
async fn get_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<AccountId>,
) -> Result<Json<Account>, ApiError> {
    Ok(Json(state.ledger.get_account(auth.user_id(), account_id).await?))
}

/// PATCH /accounts/{account_id} - Rename an account.
async fn rename_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<AccountId>,
    Json(payload): Json<RenameAccountRequest>,
) -> Result<Json<Account>, ApiError> {
    let account = state
        .ledger
        .rename_account(auth.user_id(), account_id, &payload.display_name)
        .await?;
    Ok(Json(account))
}

/// GET /accounts/{account_id}/transactions - Newest first, paginated.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<AccountId>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<Transaction>>, ApiError> {
    let account = state.ledger.get_account(auth.user_id(), account_id).await?;
    Ok(Json(page.paginate(&account.transactions)))
}
