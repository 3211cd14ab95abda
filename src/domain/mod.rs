//! Domain primitives shared across modules.

mod id;

pub use id::{ClientId, CompanyId, InteractionId, LeadId, TokenId, UserId};
