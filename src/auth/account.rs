//! User account model and its request/response payloads.
//!
//! The password hash never leaves the storage and service layers:
//! `AccountResponse` has no hash field and the model skips it during
//! serialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::UserId;
use crate::services::lifecycle::Entity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

impl Entity for UserAccount {
    const KIND: &'static str = "UserAccount";

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

/// Registration payload. `password` and `password_confirmation` must match;
/// the service enforces that along with the configured minimum length.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAccountRequest {
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Sparse account update: absent fields keep their stored values. A new
/// password requires a matching confirmation.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAccountRequest {
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    pub roles: Option<Vec<String>>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserAccount> for AccountResponse {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id.into_string(),
            full_name: account.full_name,
            email: account.email,
            roles: account.roles,
            active: account.active,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> UserAccount {
        let now = Utc::now();
        UserAccount {
            id: UserId::from_str_unchecked("user-1"),
            full_name: "Dana Cole".to_string(),
            email: "dana@example.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            roles: vec!["USER".to_string(), "CSM".to_string()],
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn has_role_matches_exactly() {
        let account = account();
        assert!(account.has_role("CSM"));
        assert!(!account.has_role("csm"));
        assert!(!account.has_role("ADMIN"));
    }

    #[test]
    fn serialized_account_omits_password_hash() {
        let json = serde_json::to_value(account()).expect("serialize");
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "dana@example.com");
    }

    #[test]
    fn response_carries_no_hash_field() {
        let response: AccountResponse = account().into();
        let json = serde_json::to_value(response).expect("serialize");
        assert!(json.get("password_hash").is_none());
    }
}
