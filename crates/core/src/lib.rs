//! Core business logic for RP Bank.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached only through the ports in [`store`].
//!
//! # Modules
//!
//! - `ledger` - Accounts, transaction logs, transfers and administrative corrections
//! - `store` - Storage ports and the in-memory adapter
//! - `directory` - Per-user address book of external accounts
//! - `registry` - Users, roles and site settings
//! - `auth` - Roles, acting identities and password hashing

pub mod auth;
pub mod directory;
pub mod ledger;
pub mod registry;
pub mod store;
