//! Field-level validation shared across account and CRM payloads.

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::{Error, Result};

lazy_static! {
    /// Pragmatic email shape check: local part, one '@', dotted domain.
    pub static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
            .unwrap_or_else(|_| Regex::new("^$").unwrap());
}

/// Lowercase and trim an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<()> {
    let normalized = normalize_email(email);
    if normalized.is_empty() {
        return Err(Error::validation_field("Email must not be empty", "email"));
    }
    if !EMAIL_REGEX.is_match(&normalized) {
        return Err(Error::validation_field(
            format!("Invalid email address: '{}'", normalized),
            "email",
        ));
    }
    Ok(())
}

/// Password length check against the configured minimum. The field name in
/// the error lets API clients highlight the right input.
pub fn validate_password(password: &str, minimum: usize) -> Result<()> {
    if password.len() < minimum {
        return Err(Error::field_below_min_size("password", minimum));
    }
    Ok(())
}

pub fn validate_full_name(full_name: &str) -> Result<()> {
    if full_name.trim().is_empty() {
        return Err(Error::validation_field("Full name must not be empty", "full_name"));
    }
    if full_name.len() > 255 {
        return Err(Error::validation_field(
            "Full name must be at most 255 characters",
            "full_name",
        ));
    }
    Ok(())
}
