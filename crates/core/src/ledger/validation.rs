//! Business rule validation for ledger operations.
//!
//! Checks run in a fixed order and the first failure wins: amount, source,
//! funds, destination. None of them mutate anything.

use rust_decimal::Decimal;
use rpbank_shared::types::AccountId;

use super::error::LedgerError;
use super::types::{Account, Destination, ResolvedDestination};

/// Transfer amounts must be strictly positive.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAmount`] for zero or negative amounts.
pub fn validate_transfer_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}

/// Adjustments are signed but cannot be zero.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAmount`] for a zero amount.
pub fn validate_adjustment_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}

/// Trims a display name and rejects it if nothing is left.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidDisplayName`] for blank names.
pub fn normalize_display_name(raw: &str) -> Result<String, LedgerError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(LedgerError::InvalidDisplayName);
    }
    Ok(name.to_string())
}

/// Finds the transfer source among the user's accounts.
///
/// # Errors
///
/// Returns [`LedgerError::SourceNotFound`] when the id is unknown or names an
/// administrative view account.
pub fn find_source(accounts: &[Account], id: AccountId) -> Result<usize, LedgerError> {
    accounts
        .iter()
        .position(|acc| acc.id == id && acc.kind.is_transferable())
        .ok_or(LedgerError::SourceNotFound(id))
}

/// Checks that the source covers `amount`.
///
/// # Errors
///
/// Returns [`LedgerError::InsufficientFunds`] when `balance < amount`.
pub fn check_funds(source: &Account, amount: Decimal) -> Result<(), LedgerError> {
    if source.balance < amount {
        return Err(LedgerError::InsufficientFunds {
            account_id: source.id,
            available: source.balance,
            requested: amount,
        });
    }
    Ok(())
}

/// Resolves a destination against the user's own accounts.
///
/// Ids must name a transferable account. Numbers resolve to the user's own
/// account when one matches and otherwise fall through to
/// [`ResolvedDestination::Unmatched`], unless external transfers are disabled.
///
/// # Errors
///
/// - [`LedgerError::DestinationUnresolvable`] for unknown ids, numbers of the
///   user's own non-transferable accounts, or unmatched numbers when
///   `allow_external` is false
/// - [`LedgerError::SameAccount`] when the destination is the source itself
pub fn resolve_destination(
    accounts: &[Account],
    source_id: AccountId,
    destination: &Destination,
    allow_external: bool,
) -> Result<ResolvedDestination, LedgerError> {
    let resolved = match destination {
        Destination::Internal(id) => accounts
            .iter()
            .find(|acc| acc.id == *id && acc.kind.is_transferable())
            .map(|acc| ResolvedDestination::InternalAccount(acc.id))
            .ok_or_else(|| LedgerError::DestinationUnresolvable(id.to_string()))?,
        Destination::ByNumber(raw) => {
            let matched = accounts
                .iter()
                .find(|acc| acc.kind.is_transferable() && acc.account_number.matches(raw));
            match matched {
                Some(acc) => ResolvedDestination::InternalAccount(acc.id),
                None if accounts.iter().any(|acc| acc.account_number.matches(raw)) => {
                    return Err(LedgerError::DestinationUnresolvable(raw.clone()));
                }
                None => {
                    let reference = raw.trim();
                    if !allow_external || reference.is_empty() {
                        return Err(LedgerError::DestinationUnresolvable(raw.clone()));
                    }
                    ResolvedDestination::Unmatched(reference.to_string())
                }
            }
        }
    };

    if resolved == ResolvedDestination::InternalAccount(source_id) {
        return Err(LedgerError::SameAccount(source_id));
    }
    Ok(resolved)
}
