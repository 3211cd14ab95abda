//! # Configuration Settings
//!
//! Configuration structures for the Pipedesk backend, loaded from environment
//! variables (with `.env` support in the binary) and validated before use.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// HTTP server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Database configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Authentication configuration
    #[validate(nested)]
    pub auth: AuthConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load the full configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config = Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(),
            observability: ObservabilityConfig::from_env(),
        };
        config.validate_all()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate_all(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    /// Custom validation logic that goes beyond what the validator crate can do
    fn validate_custom(&self) -> Result<()> {
        if !self.database.url.starts_with("sqlite://") {
            return Err(Error::validation("Database URL must start with 'sqlite://'"));
        }

        if self.auth.jwt_secret.len() < 32 {
            return Err(Error::validation("JWT secret must be at least 32 characters long"));
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let host =
            std::env::var("PIPEDESK_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PIPEDESK_API_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);

        Self { host, port }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// Database connection URL (sqlite://)
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum connections in the pool
    pub max_connections: u32,

    /// Minimum idle connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub connect_timeout_seconds: u64,

    /// Idle connection timeout in seconds (0 disables)
    pub idle_timeout_seconds: u64,

    /// Run embedded migrations automatically on startup
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/pipedesk.db".to_string(),
            max_connections: 10,
            min_connections: 0,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/pipedesk.db".to_string());

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);

        let min_connections = std::env::var("DATABASE_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);

        let connect_timeout_seconds = std::env::var("DATABASE_CONNECT_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);

        let idle_timeout_seconds = std::env::var("DATABASE_IDLE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(600);

        let auto_migrate = std::env::var("DATABASE_AUTO_MIGRATE")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(true);

        Self {
            url,
            max_connections,
            min_connections,
            connect_timeout_seconds,
            idle_timeout_seconds,
            auto_migrate,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_seconds))
        }
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite://")
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AuthConfig {
    /// HMAC secret for signing JWTs
    #[validate(length(min = 1, message = "JWT secret cannot be empty"))]
    pub jwt_secret: String,

    /// JWT validity in minutes
    pub jwt_ttl_minutes: i64,

    /// Default TTL for issued security tokens, in minutes, used when the
    /// caller passes no ttl or a non-positive one
    pub token_ttl_minutes: i64,

    /// Minimum accepted password length
    pub min_password_length: usize,

    /// Role granted to accounts created without any role
    #[validate(length(min = 1, message = "Base role cannot be empty"))]
    pub base_role: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-please-change-me-please-really".to_string(),
            jwt_ttl_minutes: 60,
            token_ttl_minutes: 30,
            min_password_length: 8,
            base_role: "USER".to_string(),
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let jwt_secret =
            std::env::var("PIPEDESK_JWT_SECRET").unwrap_or(defaults.jwt_secret);

        let jwt_ttl_minutes = std::env::var("PIPEDESK_JWT_TTL_MINUTES")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(defaults.jwt_ttl_minutes);

        let token_ttl_minutes = std::env::var("PIPEDESK_TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(defaults.token_ttl_minutes);

        let min_password_length = std::env::var("PIPEDESK_MIN_PASSWORD_LENGTH")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.min_password_length);

        let base_role =
            std::env::var("PIPEDESK_BASE_ROLE").unwrap_or(defaults.base_role);

        Self { jwt_secret, jwt_ttl_minutes, token_ttl_minutes, min_password_length, base_role }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Service name used in log records
    pub service_name: String,

    /// Default log level filter when RUST_LOG is unset
    pub log_level: String,

    /// Emit JSON-formatted logs instead of human-readable output
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "pipedesk".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let service_name =
            std::env::var("PIPEDESK_SERVICE_NAME").unwrap_or(defaults.service_name);
        let log_level = std::env::var("PIPEDESK_LOG_LEVEL").unwrap_or(defaults.log_level);
        let json_logs = std::env::var("PIPEDESK_JSON_LOGS")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(defaults.json_logs);

        Self { service_name, log_level, json_logs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate_all().is_ok());
    }

    #[test]
    fn test_rejects_non_sqlite_url() {
        let mut config = AppConfig::default();
        config.database.url = "postgresql://localhost/crm".to_string();
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_rejects_short_jwt_secret() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "too-short".to_string();
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_idle_timeout_zero_disables() {
        let mut db = DatabaseConfig::default();
        db.idle_timeout_seconds = 0;
        assert!(db.idle_timeout().is_none());

        db.idle_timeout_seconds = 30;
        assert_eq!(db.idle_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_auth_defaults() {
        let auth = AuthConfig::default();
        assert_eq!(auth.min_password_length, 8);
        assert_eq!(auth.base_role, "USER");
        assert_eq!(auth.token_ttl_minutes, 30);
    }
}
