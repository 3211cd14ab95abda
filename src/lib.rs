//! Pipedesk: a CRM backend.
//!
//! Leads, clients, companies, and interaction logs are managed through a
//! shared entity lifecycle engine; accounts, sessions, and security tokens
//! live in the auth layer. Persistence is SQLite via sqlx, the HTTP surface
//! is axum.

pub mod api;
pub mod auth;
pub mod config;
pub mod crm;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod services;
pub mod storage;

pub use errors::{Error, Result};

pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
