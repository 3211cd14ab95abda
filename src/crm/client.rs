//! Client records. A client carries two staff assignment slots, a client
//! success manager (CSM) and a solutions architect (SA), each an optional
//! reference to a user account. The service layer enforces that the
//! nominated users hold the matching role and are never the same person.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::validation::EMAIL_REGEX;
use crate::domain::{ClientId, CompanyId, UserId};
use crate::services::lifecycle::Entity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company_id: Option<CompanyId>,
    pub csm_id: Option<UserId>,
    pub sa_id: Option<UserId>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Client {
    const KIND: &'static str = "Client";

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

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[validate(regex(path = *EMAIL_REGEX, message = "Invalid email address"))]
    pub email: String,
    #[validate(length(max = 64))]
    pub phone: Option<String>,
    pub company_id: Option<String>,
    pub csm_id: Option<String>,
    pub sa_id: Option<String>,
    #[validate(length(max = 4096))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,
    #[validate(regex(path = *EMAIL_REGEX, message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 64))]
    pub phone: Option<String>,
    pub company_id: Option<String>,
    pub csm_id: Option<String>,
    pub sa_id: Option<String>,
    #[validate(length(max = 4096))]
    pub notes: Option<String>,
}

impl From<CreateClientRequest> for Client {
    fn from(request: CreateClientRequest) -> Self {
        let now = Utc::now();
        Self {
            id: ClientId::new(),
            full_name: request.full_name,
            email: request.email.trim().to_lowercase(),
            phone: request.phone,
            company_id: request.company_id.map(CompanyId::from_string),
            csm_id: request.csm_id.map(UserId::from_string),
            sa_id: request.sa_id.map(UserId::from_string),
            notes: request.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClientResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company_id: Option<String>,
    pub csm_id: Option<String>,
    pub sa_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id.into_string(),
            full_name: client.full_name,
            email: client.email,
            phone: client.phone,
            company_id: client.company_id.map(CompanyId::into_string),
            csm_id: client.csm_id.map(UserId::into_string),
            sa_id: client.sa_id.map(UserId::into_string),
            notes: client.notes,
            created_at: client.created_at,
            updated_at: client.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_normalizes_email_and_maps_ids() {
        let request = CreateClientRequest {
            full_name: "Robin Wexler".to_string(),
            email: "Robin@Example.com".to_string(),
            phone: None,
            company_id: Some("company-1".to_string()),
            csm_id: Some("user-1".to_string()),
            sa_id: None,
            notes: None,
        };

        let client: Client = request.into();
        assert_eq!(client.email, "robin@example.com");
        assert_eq!(client.company_id.as_ref().map(CompanyId::as_str), Some("company-1"));
        assert_eq!(client.csm_id.as_ref().map(UserId::as_str), Some("user-1"));
        assert!(client.sa_id.is_none());
    }
}
