//! Transfers out of the caller's accounts.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use rpbank_core::ledger::{
    Destination, ResolvedDestination, Transaction, TransferReceipt, TransferRequest,
};
use rpbank_shared::types::{AccountId, ContactId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::accounts::AccountSummary;
use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the transfer routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transfers", post(create_transfer))
        .route("/transfers/sources", get(list_sources))
}

/// Where the money should go.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DestinationInput {
    /// Another account of the caller.
    #[serde(rename_all = "camelCase")]
    Internal {
        /// Target account.
        account_id: AccountId,
    },
    /// A literal account number, internal or external.
    #[serde(rename_all = "camelCase")]
    Number {
        /// Number as typed by the user.
        account_number: String,
    },
    /// A saved contact.
    #[serde(rename_all = "camelCase")]
    Contact {
        /// Contact in the caller's book.
        contact_id: ContactId,
    },
}

/// Request body for a transfer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequest {
    /// Account to debit.
    pub from_account_id: AccountId,
    /// Target.
    pub destination: DestinationInput,
    /// Positive amount.
    pub amount: Decimal,
    /// Optional description for both legs.
    #[serde(default)]
    pub description: Option<String>,
}

/// Resolved target of a completed transfer.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DestinationView {
    /// Credited one of the caller's accounts.
    #[serde(rename_all = "camelCase")]
    Internal {
        /// Credited account.
        account_id: AccountId,
    },
    /// Left the bank.
    #[serde(rename_all = "camelCase")]
    External {
        /// Number the money was sent to.
        account_number: String,
    },
}

/// Response for a completed transfer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    /// Debit on the source account.
    pub debit: Transaction,
    /// Credit on the destination, internal transfers only.
    pub credit: Option<Transaction>,
    /// Where the money went.
    pub destination: DestinationView,
    /// Source balance afterwards.
    pub source_balance: Decimal,
    /// Destination balance afterwards, internal transfers only.
    pub destination_balance: Option<Decimal>,
}

impl From<TransferReceipt> for TransferResponse {
    fn from(receipt: TransferReceipt) -> Self {
        let destination = match receipt.destination {
            ResolvedDestination::InternalAccount(account_id) => {
                DestinationView::Internal { account_id }
            }
            ResolvedDestination::Unmatched(account_number) => {
                DestinationView::External { account_number }
            }
        };
        Self {
            debit: receipt.debit,
            credit: receipt.credit,
            destination,
            source_balance: receipt.source_balance,
            destination_balance: receipt.destination_balance,
        }
    }
}

/// POST /transfers
async fn create_transfer(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateTransferRequest>,
) -> Result<Json<TransferResponse>, ApiError> {
    let user_id = auth.user_id();
    let destination = match payload.destination {
        DestinationInput::Internal { account_id } => Destination::Internal(account_id),
        DestinationInput::Number { account_number } => Destination::ByNumber(account_number),
        DestinationInput::Contact { contact_id } => {
            state.directory.destination_for(user_id, contact_id).await?
        }
    };

    let receipt = state
        .ledger
        .transfer(
            user_id,
            TransferRequest {
                from_account_id: payload.from_account_id,
                destination,
                amount: payload.amount,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(receipt.into()))
}

/// GET /transfers/sources - Accounts that can be debited.
async fn list_sources(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<AccountSummary>>, ApiError> {
    let accounts = state.ledger.transfer_sources(auth.user_id()).await?;
    Ok(Json(accounts.iter().map(AccountSummary::from).collect()))
}
