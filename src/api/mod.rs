//! HTTP API: routing, handlers, error mapping, server bootstrap.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{build_router, ApiState};
pub use server::{build_state, run_server};
