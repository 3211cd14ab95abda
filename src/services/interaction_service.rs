//! Interaction logging. Every entry must point at an existing lead.

use std::sync::Arc;

use tracing::{info, instrument};
use validator::Validate;

use crate::crm::{CreateInteractionRequest, LeadInteraction, UpdateInteractionRequest};
use crate::domain::LeadId;
use crate::errors::{Error, Result};
use crate::services::lifecycle::{merge, LifecycleService, NoHooks};
use crate::storage::repositories::{InteractionRepository, LeadRepository};

pub struct InteractionService {
    engine: LifecycleService<LeadInteraction, NoHooks>,
    repository: Arc<dyn InteractionRepository>,
    leads: Arc<dyn LeadRepository>,
}

impl InteractionService {
    pub fn new<R, L>(repository: Arc<R>, leads: Arc<L>) -> Self
    where
        R: InteractionRepository + 'static,
        L: LeadRepository + 'static,
    {
        Self { engine: LifecycleService::new(repository.clone(), NoHooks), repository, leads }
    }

    #[instrument(skip(self, request), fields(lead_id = %request.lead_id))]
    pub async fn create(&self, request: CreateInteractionRequest) -> Result<LeadInteraction> {
        request.validate()?;

        if self.leads.find_by_id(&request.lead_id).await?.is_none() {
            return Err(Error::not_found("Lead", request.lead_id));
        }

        let interaction = self.engine.create(request.into()).await?;
        info!(interaction_id = %interaction.id, "interaction recorded");
        Ok(interaction)
    }

    pub async fn get(&self, id: &str) -> Result<LeadInteraction> {
        self.engine.get(id).await
    }

    pub async fn list(&self) -> Result<Vec<LeadInteraction>> {
        self.engine.list().await
    }

    pub async fn list_for_lead(&self, lead_id: &LeadId) -> Result<Vec<LeadInteraction>> {
        self.repository.find_by_lead(lead_id).await
    }

    pub async fn delete(&self, id: &str) -> Result<LeadInteraction> {
        self.engine.delete(id).await
    }

    #[instrument(skip(self, request), fields(interaction_id = %id))]
    pub async fn update(&self, id: &str, request: UpdateInteractionRequest) -> Result<LeadInteraction> {
        request.validate()?;
        let mut interaction = self.engine.get(id).await?;

        merge(&mut interaction.kind, request.kind);
        merge(&mut interaction.summary, request.summary);
        merge(&mut interaction.occurred_at, request.occurred_at);

        self.engine.persist_update(&mut interaction).await?;
        Ok(interaction)
    }
}
