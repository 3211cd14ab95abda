//! Security tokens: short-lived single-purpose secrets tied to an account
//! (password reset, account activation).
//!
//! Expiry is lazy. Nothing sweeps expired rows; a token is live exactly when
//! it exists and its deadline is in the future, and expired rows stay in
//! place until explicitly consumed or replaced.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{TokenId, UserId};
use crate::errors::Error;
use crate::services::lifecycle::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenPurpose {
    PasswordReset,
    AccountActivation,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::PasswordReset => "PASSWORD_RESET",
            TokenPurpose::AccountActivation => "ACCOUNT_ACTIVATION",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenPurpose {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PASSWORD_RESET" => Ok(TokenPurpose::PasswordReset),
            "ACCOUNT_ACTIVATION" => Ok(TokenPurpose::AccountActivation),
            other => Err(Error::validation_field(
                format!("Unknown token purpose: '{}'", other),
                "purpose",
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityToken {
    pub id: TokenId,
    pub user_id: UserId,
    /// The opaque secret handed to the caller; unique across all rows.
    pub token: String,
    pub purpose: TokenPurpose,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SecurityToken {
    /// Live means present and not past its deadline at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

impl Entity for SecurityToken {
    const KIND: &'static str = "SecurityToken";

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn stamp_created(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
        self.updated_at = at;
    }

    fn stamp_updated(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_at: DateTime<Utc>) -> SecurityToken {
        let now = Utc::now();
        SecurityToken {
            id: TokenId::new(),
            user_id: UserId::from_str_unchecked("user-1"),
            token: "secret".to_string(),
            purpose: TokenPurpose::PasswordReset,
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn validity_is_strictly_before_deadline() {
        let now = Utc::now();
        assert!(token(now + Duration::minutes(1)).is_valid_at(now));
        assert!(!token(now).is_valid_at(now));
        assert!(!token(now - Duration::minutes(1)).is_valid_at(now));
    }

    #[test]
    fn purpose_round_trips_through_strings() {
        for purpose in [TokenPurpose::PasswordReset, TokenPurpose::AccountActivation] {
            let parsed: TokenPurpose = purpose.as_str().parse().expect("parse purpose");
            assert_eq!(parsed, purpose);
        }
        assert!("REFRESH".parse::<TokenPurpose>().is_err());
    }
}
