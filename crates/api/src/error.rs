//! Error responses.
//!
//! Every failure renders as `{ "error": <code>, "message": <text> }` with the
//! status the domain error reports for itself.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rpbank_core::directory::DirectoryError;
use rpbank_core::ledger::LedgerError;
use rpbank_core::registry::RegistryError;
use rpbank_shared::JwtError;
use serde_json::json;
use tracing::{error, warn};

/// Anything a handler can fail with.
#[derive(Debug)]
pub enum ApiError {
    /// Ledger engine rejection.
    Ledger(LedgerError),
    /// Contact book rejection.
    Directory(DirectoryError),
    /// Registry or site setup rejection.
    Registry(RegistryError),
    /// Token could not be issued.
    Token(JwtError),
    /// Caller is not an administrator.
    Forbidden,
    /// Malformed input the services never see.
    BadRequest(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        let code = match self {
            Self::Ledger(e) => e.http_status_code(),
            Self::Directory(e) => e.http_status_code(),
            Self::Registry(e) => e.http_status_code(),
            Self::Token(_) => 500,
            Self::Forbidden => 403,
            Self::BadRequest(_) => 400,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::Directory(e) => e.error_code(),
            Self::Registry(e) => e.error_code(),
            Self::Token(_) => "INTERNAL_ERROR",
            Self::Forbidden => "FORBIDDEN",
            Self::BadRequest(_) => "VALIDATION_ERROR",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Ledger(e) => e.to_string(),
            Self::Directory(e) => e.to_string(),
            Self::Registry(e) => e.to_string(),
            Self::Token(e) => e.to_string(),
            Self::Forbidden => "Administrator role required".to_string(),
            Self::BadRequest(message) => message.clone(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        Self::Ledger(e)
    }
}

impl From<DirectoryError> for ApiError {
    fn from(e: DirectoryError) -> Self {
        Self::Directory(e)
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

impl From<JwtError> for ApiError {
    fn from(e: JwtError) -> Self {
        Self::Token(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self.message(), code = self.code(), "Request failed");
            "An internal error occurred".to_string()
        } else {
            warn!(error = %self.message(), code = self.code(), "Request rejected");
            self.message()
        };

        (
            status,
            Json(json!({
                "error": self.code(),
                "message": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpbank_shared::types::AccountId;
    use rust_decimal::Decimal;

    #[test]
    fn test_status_follows_domain_error() {
        let err = ApiError::from(LedgerError::InsufficientFunds {
            account_id: AccountId::new(),
            available: Decimal::ONE,
            requested: Decimal::TEN,
        });
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), "INSUFFICIENT_FUNDS");

        let err = ApiError::from(RegistryError::InvalidCredentials);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = ApiError::Token(JwtError::EncodingError("bad key".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
