//! Lead management on top of the lifecycle engine.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};
use validator::Validate;

use crate::auth::validation::normalize_email;
use crate::crm::{CreateLeadRequest, Lead, LeadStatus, UpdateLeadRequest};
use crate::errors::{Error, Result};
use crate::services::lifecycle::{merge, merge_opt, LifecycleHooks, LifecycleService};
use crate::storage::repositories::LeadRepository;

/// Leads are unique by normalized email.
pub struct LeadHooks {
    repository: Arc<dyn LeadRepository>,
}

#[async_trait]
impl LifecycleHooks<Lead> for LeadHooks {
    async fn find_conflict(&self, candidate: &Lead) -> Result<Option<String>> {
        Ok(self.repository.find_by_email(&candidate.email).await?.map(|existing| existing.email))
    }
}

pub struct LeadService {
    engine: LifecycleService<Lead, LeadHooks>,
    repository: Arc<dyn LeadRepository>,
}

impl LeadService {
    pub fn new<R>(repository: Arc<R>) -> Self
    where
        R: LeadRepository + 'static,
    {
        let hooks = LeadHooks { repository: repository.clone() };
        Self { engine: LifecycleService::new(repository.clone(), hooks), repository }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create(&self, request: CreateLeadRequest) -> Result<Lead> {
        request.validate()?;
        let lead = self.engine.create(request.into()).await?;
        info!(lead_id = %lead.id, "lead created");
        Ok(lead)
    }

    pub async fn get(&self, id: &str) -> Result<Lead> {
        self.engine.get(id).await
    }

    pub async fn list(&self) -> Result<Vec<Lead>> {
        self.engine.list().await
    }

    pub async fn list_by_status(&self, status: LeadStatus) -> Result<Vec<Lead>> {
        self.repository.find_by_status(status).await
    }

    pub async fn delete(&self, id: &str) -> Result<Lead> {
        self.engine.delete(id).await
    }

    /// Sparse update. A changed email is normalized and re-checked for
    /// conflicts against other leads.
    #[instrument(skip(self, request), fields(lead_id = %id))]
    pub async fn update(&self, id: &str, request: UpdateLeadRequest) -> Result<Lead> {
        request.validate()?;
        let mut lead = self.engine.get(id).await?;

        if let Some(email) = &request.email {
            let normalized = normalize_email(email);
            if normalized != lead.email {
                if let Some(existing) = self.repository.find_by_email(&normalized).await? {
                    if existing.id != lead.id {
                        return Err(Error::already_exists("Lead", normalized));
                    }
                }
                lead.email = normalized;
            }
        }

        merge(&mut lead.full_name, request.full_name);
        merge_opt(&mut lead.phone, request.phone);
        merge_opt(&mut lead.company_name, request.company_name);
        merge(&mut lead.status, request.status);
        merge_opt(&mut lead.source, request.source);
        merge_opt(&mut lead.notes, request.notes);

        self.engine.persist_update(&mut lead).await?;
        info!(lead_id = %lead.id, "lead updated");
        Ok(lead)
    }
}
