//! # Configuration Management
//!
//! Environment-driven configuration for the Pipedesk backend.

mod settings;

pub use settings::{AppConfig, AuthConfig, DatabaseConfig, ObservabilityConfig, ServerConfig};
