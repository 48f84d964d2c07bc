//! Account ledger logic.
//!
//! This module implements the core ledger functionality:
//! - Accounts with an embedded, newest-first transaction log
//! - Account number generation
//! - Balance reconciliation against the log
//! - Business rule validation
//! - Error types for ledger operations
//! - The ledger engine (account opening, transfers, administrative corrections)
//! - Per-user serialization of read-modify-write sequences

pub mod balance;
pub mod error;
pub mod locks;
pub mod number;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use balance::BalanceDrift;
pub use error::LedgerError;
pub use locks::UserLocks;
pub use number::{AccountNumber, InvalidAccountNumber};
pub use service::{LedgerConfig, LedgerEngine};
pub use types::{
    Account, AccountKind, AccountView, Destination, ResolvedDestination, Transaction,
    TransactionCategory, TransactionKind, TransferReceipt, TransferRequest,
};
