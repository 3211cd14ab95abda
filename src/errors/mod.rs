//! # Error Types
//!
//! Error taxonomy for the Pipedesk CRM backend using `thiserror`. Engine code
//! never maps errors to transport concerns; `status_code()` is advisory and
//! consumed by the API layer only.

use chrono::{DateTime, Utc};

/// Custom result type for Pipedesk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Pipedesk backend
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Lookup by id or natural key found nothing
    #[error("{kind} not found: '{id}'")]
    NotFound { kind: String, id: String },

    /// Uniqueness violated on create
    #[error("{kind} already exists with key '{key}'")]
    AlreadyExists { kind: String, key: String },

    /// Credential verification failed
    #[error("invalid credentials for '{identifier}'")]
    InvalidCredentials { identifier: String },

    /// Account is administratively disabled; reported in preference to
    /// InvalidCredentials when both could apply
    #[error("account disabled: '{identifier}'")]
    AccountDisabled { identifier: String },

    /// New password does not match its confirmation
    #[error("password confirmation mismatch for '{identifier}' ({full_name})")]
    PasswordMismatch { identifier: String, full_name: String },

    /// Validated field shorter than the configured minimum
    #[error("field '{field}' is below the minimum size of {minimum}")]
    FieldBelowMinSize { field: String, minimum: usize },

    /// Reset-confirm flow: no token with that value
    #[error("reset token not found: '{token}'")]
    ResetTokenNotFound { token: String },

    /// Reset-confirm flow: token past its expiration date
    #[error("reset token '{token}' expired at {expired_at}")]
    ResetTokenExpired { token: String, expired_at: DateTime<Utc> },

    /// Token issuance for an email with no account
    #[error("cannot issue {purpose} token: no account for '{email}'")]
    TokenEmailNotFound { purpose: String, email: String },

    /// CSM/SA assignment: nominated user lacks the required role
    #[error("user '{user_id}' ({full_name}) does not hold required role {role} (has: {actual_roles:?})")]
    RoleRequirementNotMet {
        role: String,
        user_id: String,
        full_name: String,
        actual_roles: Vec<String>,
    },

    /// CSM/SA assignment: same user on both sides of the pairing
    #[error("user '{user_id}' cannot be both {role} and its counterpart on the same client")]
    RoleConflict { role: String, user_id: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Database and storage errors
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server errors
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create a not found error
    pub fn not_found<K: Into<String>, I: Into<String>>(kind: K, id: I) -> Self {
        Self::NotFound { kind: kind.into(), id: id.into() }
    }

    /// Create an already-exists error
    pub fn already_exists<K: Into<String>, V: Into<String>>(kind: K, key: V) -> Self {
        Self::AlreadyExists { kind: kind.into(), key: key.into() }
    }

    pub fn invalid_credentials<S: Into<String>>(identifier: S) -> Self {
        Self::InvalidCredentials { identifier: identifier.into() }
    }

    pub fn account_disabled<S: Into<String>>(identifier: S) -> Self {
        Self::AccountDisabled { identifier: identifier.into() }
    }

    pub fn password_mismatch<I: Into<String>, N: Into<String>>(identifier: I, full_name: N) -> Self {
        Self::PasswordMismatch { identifier: identifier.into(), full_name: full_name.into() }
    }

    pub fn field_below_min_size<F: Into<String>>(field: F, minimum: usize) -> Self {
        Self::FieldBelowMinSize { field: field.into(), minimum }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create an internal server error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Create an internal error with source
    pub fn internal_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Internal { message: message.into(), source: Some(source) }
    }

    /// Get the HTTP status code that should be returned for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            // The source system reported duplicate keys and store failures as
            // server-side failures; preserved as observed.
            Error::AlreadyExists { .. } => 500,
            Error::Database { .. } => 500,
            Error::Config(_) => 500,
            Error::Internal { .. } => 500,
            Error::Validation { .. } => 400,
            Error::PasswordMismatch { .. } => 400,
            Error::FieldBelowMinSize { .. } => 400,
            Error::RoleRequirementNotMet { .. } => 400,
            Error::RoleConflict { .. } => 400,
            Error::InvalidCredentials { .. } => 401,
            Error::AccountDisabled { .. } => 401,
            Error::ResetTokenNotFound { .. } => 401,
            Error::ResetTokenExpired { .. } => 401,
            Error::TokenEmailNotFound { .. } => 401,
        }
    }

    /// True for the authentication-failure class of errors
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Error::InvalidCredentials { .. }
                | Error::AccountDisabled { .. }
                | Error::ResetTokenNotFound { .. }
                | Error::ResetTokenExpired { .. }
                | Error::TokenEmailNotFound { .. }
        )
    }
}

// Error conversions for common external error types

impl From<sqlx::Error> for Error {
    fn from(error: sqlx::Error) -> Self {
        Self::Database { source: error, context: "Database operation failed".to_string() }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(format!("Validation failed: {}", message))
    }
}

/// Detect a SQLite unique-constraint violation and remap it to
/// `AlreadyExists`; every other database error keeps its context.
pub fn map_constraint_violation<K, V>(error: sqlx::Error, kind: K, key: V, context: &str) -> Error
where
    K: Into<String>,
    V: Into<String>,
{
    if let Some(db_err) = error.as_database_error() {
        if let Some(code) = db_err.code() {
            if code.as_ref() == "2067" || code.as_ref().starts_with("SQLITE_CONSTRAINT") {
                return Error::already_exists(kind, key);
            }
        }
    }
    Error::Database { source: error, context: context.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = Error::not_found("Lead", "abc-123");
        assert!(matches!(error, Error::NotFound { .. }));
        assert_eq!(error.to_string(), "Lead not found: 'abc-123'");
    }

    #[test]
    fn test_already_exists_message() {
        let error = Error::already_exists("UserAccount", "a@x.com");
        assert_eq!(error.to_string(), "UserAccount already exists with key 'a@x.com'");
    }

    #[test]
    fn test_validation_error_field() {
        let error = Error::validation_field("Invalid email format", "email");
        if let Error::Validation { field, .. } = error {
            assert_eq!(field, Some("email".to_string()));
        } else {
            panic!("expected validation error");
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::validation("test").status_code(), 400);
        assert_eq!(Error::not_found("Client", "x").status_code(), 404);
        assert_eq!(Error::already_exists("Client", "x").status_code(), 500);
        assert_eq!(Error::invalid_credentials("a@x.com").status_code(), 401);
        assert_eq!(Error::account_disabled("a@x.com").status_code(), 401);
        assert_eq!(Error::password_mismatch("a@x.com", "A").status_code(), 400);
        assert_eq!(Error::field_below_min_size("password", 8).status_code(), 400);
        assert_eq!(Error::internal("test").status_code(), 500);
    }

    #[test]
    fn test_auth_failure_class() {
        assert!(Error::invalid_credentials("x").is_auth_failure());
        assert!(Error::ResetTokenNotFound { token: "t".into() }.is_auth_failure());
        assert!(!Error::validation("x").is_auth_failure());
        assert!(!Error::not_found("Lead", "x").is_auth_failure());
    }

    #[test]
    fn test_sqlx_conversion() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::Database { .. }));
    }

    #[test]
    fn test_non_constraint_error_stays_database() {
        let err = map_constraint_violation(sqlx::Error::RowNotFound, "Lead", "x", "insert lead");
        assert!(matches!(err, Error::Database { .. }));
    }
}
