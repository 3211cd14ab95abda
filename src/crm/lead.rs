//! Lead records and the pipeline status they move through.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::validation::EMAIL_REGEX;
use crate::domain::LeadId;
use crate::errors::Error;
use crate::services::lifecycle::Entity;

/// Pipeline position of a lead. New records start at `New` unless the
/// caller provides a status explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "NEW",
            LeadStatus::Contacted => "CONTACTED",
            LeadStatus::Qualified => "QUALIFIED",
            LeadStatus::Converted => "CONVERTED",
            LeadStatus::Lost => "LOST",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "NEW" => Ok(LeadStatus::New),
            "CONTACTED" => Ok(LeadStatus::Contacted),
            "QUALIFIED" => Ok(LeadStatus::Qualified),
            "CONVERTED" => Ok(LeadStatus::Converted),
            "LOST" => Ok(LeadStatus::Lost),
            other => Err(Error::validation_field(
                format!("Unknown lead status: '{}'", other),
                "status",
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub status: LeadStatus,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Lead {
    const KIND: &'static str = "Lead";

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
pub struct CreateLeadRequest {
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[validate(regex(path = *EMAIL_REGEX, message = "Invalid email address"))]
    pub email: String,
    #[validate(length(max = 64))]
    pub phone: Option<String>,
    #[validate(length(max = 255))]
    pub company_name: Option<String>,
    pub status: Option<LeadStatus>,
    #[validate(length(max = 255))]
    pub source: Option<String>,
    #[validate(length(max = 4096))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLeadRequest {
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,
    #[validate(regex(path = *EMAIL_REGEX, message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 64))]
    pub phone: Option<String>,
    #[validate(length(max = 255))]
    pub company_name: Option<String>,
    pub status: Option<LeadStatus>,
    #[validate(length(max = 255))]
    pub source: Option<String>,
    #[validate(length(max = 4096))]
    pub notes: Option<String>,
}

impl From<CreateLeadRequest> for Lead {
    fn from(request: CreateLeadRequest) -> Self {
        let now = Utc::now();
        Self {
            id: LeadId::new(),
            full_name: request.full_name,
            email: request.email.trim().to_lowercase(),
            phone: request.phone,
            company_name: request.company_name,
            status: request.status.unwrap_or_default(),
            source: request.source,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeadResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub status: LeadStatus,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Lead> for LeadResponse {
    fn from(lead: Lead) -> Self {
        Self {
            id: lead.id.into_string(),
            full_name: lead.full_name,
            email: lead.email,
            phone: lead.phone,
            company_name: lead.company_name,
            status: lead.status,
            source: lead.source,
            notes: lead.notes,
            created_at: lead.created_at,
            updated_at: lead.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str) -> CreateLeadRequest {
        CreateLeadRequest {
            full_name: "Dana Cole".to_string(),
            email: email.to_string(),
            phone: None,
            company_name: None,
            status: None,
            source: None,
            notes: None,
        }
    }

    #[test]
    fn status_defaults_to_new() {
        let lead: Lead = request("dana@example.com").into();
        assert_eq!(lead.status, LeadStatus::New);
    }

    #[test]
    fn email_is_normalized_on_conversion() {
        let lead: Lead = request("  Dana@Example.COM ").into();
        assert_eq!(lead.email, "dana@example.com");
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            LeadStatus::New,
            LeadStatus::Contacted,
            LeadStatus::Qualified,
            LeadStatus::Converted,
            LeadStatus::Lost,
        ] {
            let parsed: LeadStatus = status.as_str().parse().expect("parse status");
            assert_eq!(parsed, status);
        }
        assert!("PENDING".parse::<LeadStatus>().is_err());
    }

    #[test]
    fn invalid_email_fails_validation() {
        assert!(request("not-an-email").validate().is_err());
        assert!(request("dana@example.com").validate().is_ok());
    }
}
