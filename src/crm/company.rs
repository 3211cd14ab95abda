//! Company records: the natural key is the company name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::CompanyId;
use crate::services::lifecycle::Entity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Company {
    const KIND: &'static str = "Company";

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
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 255))]
    pub industry: Option<String>,
    #[validate(length(max = 255))]
    pub website: Option<String>,
    #[validate(length(max = 1024))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub industry: Option<String>,
    #[validate(length(max = 255))]
    pub website: Option<String>,
    #[validate(length(max = 1024))]
    pub address: Option<String>,
}

impl From<CreateCompanyRequest> for Company {
    fn from(request: CreateCompanyRequest) -> Self {
        let now = Utc::now();
        Self {
            id: CompanyId::new(),
            name: request.name,
            industry: request.industry,
            website: request.website,
            address: request.address,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompanyResponse {
    pub id: String,
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Company> for CompanyResponse {
    fn from(company: Company) -> Self {
        Self {
            id: company.id.into_string(),
            name: company.name,
            industry: company.industry,
            website: company.website,
            address: company.address,
            created_at: company.created_at,
            updated_at: company.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_becomes_company_with_fresh_id() {
        let request = CreateCompanyRequest {
            name: "Acme Corp".to_string(),
            industry: Some("Logistics".to_string()),
            website: None,
            address: None,
        };

        let company: Company = request.into();
        assert!(!company.id.as_str().is_empty());
        assert_eq!(company.name, "Acme Corp");
        assert_eq!(company.industry.as_deref(), Some("Logistics"));
        assert_eq!(company.created_at, company.updated_at);
    }

    #[test]
    fn empty_name_fails_validation() {
        let request = CreateCompanyRequest {
            name: String::new(),
            industry: None,
            website: None,
            address: None,
        };
        assert!(request.validate().is_err());
    }
}
