//! Authenticated caller identity and the login wire payloads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::account::UserAccount;
use crate::domain::UserId;

/// Who the caller is once authentication succeeds. Attached to requests by
/// the auth middleware and consumed by handlers.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub authorities: Vec<String>,
}

impl Principal {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

impl From<&UserAccount> for Principal {
    fn from(account: &UserAccount) -> Self {
        Self {
            user_id: account.id.clone(),
            email: account.email.clone(),
            authorities: account.roles.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub roles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn principal_carries_account_identity() {
        let now = Utc::now();
        let account = UserAccount {
            id: UserId::from_str_unchecked("user-1"),
            full_name: "Dana Cole".to_string(),
            email: "dana@example.com".to_string(),
            password_hash: "hash".to_string(),
            roles: vec!["USER".to_string(), "SA".to_string()],
            active: true,
            created_at: now,
            updated_at: now,
        };

        let principal = Principal::from(&account);
        assert_eq!(principal.user_id.as_str(), "user-1");
        assert!(principal.has_authority("SA"));
        assert!(!principal.has_authority("ADMIN"));
    }
}
