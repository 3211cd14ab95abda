//! Interaction log entries attached to a lead (calls, emails, meetings).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{InteractionId, LeadId};
use crate::errors::Error;
use crate::services::lifecycle::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionKind {
    Call,
    Email,
    Meeting,
    Note,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Call => "CALL",
            InteractionKind::Email => "EMAIL",
            InteractionKind::Meeting => "MEETING",
            InteractionKind::Note => "NOTE",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CALL" => Ok(InteractionKind::Call),
            "EMAIL" => Ok(InteractionKind::Email),
            "MEETING" => Ok(InteractionKind::Meeting),
            "NOTE" => Ok(InteractionKind::Note),
            other => Err(Error::validation_field(
                format!("Unknown interaction kind: '{}'", other),
                "kind",
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadInteraction {
    pub id: InteractionId,
    pub lead_id: LeadId,
    pub kind: InteractionKind,
    pub summary: String,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for LeadInteraction {
    const KIND: &'static str = "LeadInteraction";

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
pub struct CreateInteractionRequest {
    pub lead_id: String,
    pub kind: InteractionKind,
    #[validate(length(min = 1, max = 4096))]
    pub summary: String,
    /// Defaults to the time of recording when absent.
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateInteractionRequest {
    pub kind: Option<InteractionKind>,
    #[validate(length(min = 1, max = 4096))]
    pub summary: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl From<CreateInteractionRequest> for LeadInteraction {
    fn from(request: CreateInteractionRequest) -> Self {
        let now = Utc::now();
        Self {
            id: InteractionId::new(),
            lead_id: LeadId::from_string(request.lead_id),
            kind: request.kind,
            summary: request.summary,
            occurred_at: request.occurred_at.unwrap_or(now),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InteractionResponse {
    pub id: String,
    pub lead_id: String,
    pub kind: InteractionKind,
    pub summary: String,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LeadInteraction> for InteractionResponse {
    fn from(interaction: LeadInteraction) -> Self {
        Self {
            id: interaction.id.into_string(),
            lead_id: interaction.lead_id.into_string(),
            kind: interaction.kind,
            summary: interaction.summary,
            occurred_at: interaction.occurred_at,
            created_at: interaction.created_at,
            updated_at: interaction.updated_at,
        }
    }
}
