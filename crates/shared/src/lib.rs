//! Shared types, configuration, and token handling for RP Bank.
//!
//! This crate provides common types used across all other crates:
//! - Money types with decimal precision
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Configuration management
//! - JWT claims and token handling

pub mod auth;
pub mod config;
pub mod jwt;
pub mod types;


pub use auth::{Claims, LoginRequest, LoginResponse, RegisterRequest, UserInfo};
pub use config::{AppConfig, BankConfig, DatabaseConfig, JwtSettings, ServerConfig};
pub use jwt::{JwtConfig, JwtError, JwtService};
