//! SQLite repositories, one module per persisted kind. Each exposes a trait
//! extending the generic [`EntityStore`](crate::services::lifecycle::EntityStore)
//! with the kind's unique-key and predicate lookups, plus the sqlx-backed
//! implementation.

pub mod client;
pub mod company;
pub mod interaction;
pub mod lead;
pub mod token;
pub mod user;

pub use client::{ClientRepository, SqlxClientRepository};
pub use company::{CompanyRepository, SqlxCompanyRepository};
pub use interaction::{InteractionRepository, SqlxInteractionRepository};
pub use lead::{LeadRepository, SqlxLeadRepository};
pub use token::{SecurityTokenRepository, SqlxSecurityTokenRepository};
pub use user::{SqlxUserAccountRepository, UserAccountRepository};
