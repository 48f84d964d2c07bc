//! Ledger error types.
//!
//! Every failed ledger operation returns one of these and leaves the stored
//! accounts untouched.

use rust_decimal::Decimal;
use thiserror::Error;
use rpbank_shared::types::{AccountId, TransactionId, UserId};

use crate::store::StoreError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Transfer amounts must be strictly positive; adjustments must be non-zero.
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Account display names cannot be blank.
    #[error("Account name cannot be blank")]
    InvalidDisplayName,

    /// Source and destination are the same account.
    #[error("Cannot transfer from account {0} to itself")]
    SameAccount(AccountId),

    // ========== Account Errors ==========
    /// Transfer source is not a transferable account of the user.
    #[error("Source account not found: {0}")]
    SourceNotFound(AccountId),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Destination cannot be resolved to an account.
    #[error("Destination cannot be resolved: {0}")]
    DestinationUnresolvable(String),

    /// Transaction not found in the account's log.
    #[error("Transaction {transaction_id} not found on account {account_id}")]
    TransactionNotFound {
        /// The account searched.
        account_id: AccountId,
        /// The missing transaction.
        transaction_id: TransactionId,
    },

    // ========== Funds Errors ==========
    /// Source balance does not cover the transfer.
    #[error("Insufficient funds on account {account_id}: available {available}, requested {requested}")]
    InsufficientFunds {
        /// The source account.
        account_id: AccountId,
        /// Current balance.
        available: Decimal,
        /// Amount requested.
        requested: Decimal,
    },

    /// Applying an amount would push a balance out of the representable range.
    #[error("Balance of account {account_id} would overflow")]
    BalanceOverflow {
        /// The account whose balance is out of range.
        account_id: AccountId,
    },

    // ========== Authorization Errors ==========
    /// Caller lacks the administrator role.
    #[error("User {user_id} is not allowed to perform administrative operations")]
    Unauthorized {
        /// The acting user.
        user_id: UserId,
    },

    // ========== Storage Errors ==========
    /// The account store failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidDisplayName => "INVALID_DISPLAY_NAME",
            Self::SameAccount(_) => "SAME_ACCOUNT",
            Self::SourceNotFound(_) => "SOURCE_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::DestinationUnresolvable(_) => "DESTINATION_UNRESOLVABLE",
            Self::TransactionNotFound { .. } => "TRANSACTION_NOT_FOUND",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::BalanceOverflow { .. } => "BALANCE_OVERFLOW",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::Store(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount(_) | Self::InvalidDisplayName | Self::SameAccount(_) => 400,
            Self::Unauthorized { .. } => 403,
            Self::SourceNotFound(_)
            | Self::AccountNotFound(_)
            | Self::TransactionNotFound { .. } => 404,
            Self::DestinationUnresolvable(_)
            | Self::InsufficientFunds { .. }
            | Self::BalanceOverflow { .. } => 422,
            Self::Store(_) => 500,
        }
    }

    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(StoreError::Unavailable(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes_and_statuses() {
        let id = AccountId::new();

        let err = LedgerError::InsufficientFunds {
            account_id: id,
            available: dec!(10),
            requested: dec!(20),
        };
        assert_eq!(err.error_code(), "INSUFFICIENT_FUNDS");
        assert_eq!(err.http_status_code(), 422);

        assert_eq!(LedgerError::InvalidAmount(dec!(0)).http_status_code(), 400);
        assert_eq!(LedgerError::SourceNotFound(id).http_status_code(), 404);
        assert_eq!(
            LedgerError::Unauthorized { user_id: UserId::new() }.http_status_code(),
            403
        );

        let err = LedgerError::BalanceOverflow { account_id: id };
        assert_eq!(err.error_code(), "BALANCE_OVERFLOW");
        assert_eq!(err.http_status_code(), 422);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_store_errors_convert() {
        let err: LedgerError = StoreError::Unavailable("connection reset".into()).into();
        assert!(err.is_retryable());
        assert_eq!(err.http_status_code(), 500);

        let err: LedgerError = StoreError::Corrupt("bad json".into()).into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_insufficient_funds_message() {
        let err = LedgerError::InsufficientFunds {
            account_id: AccountId::new(),
            available: dec!(10.00),
            requested: dec!(20.00),
        };
        let message = err.to_string();
        assert!(message.contains("available 10.00"));
        assert!(message.contains("requested 20.00"));
    }
}
