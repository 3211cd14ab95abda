//! Company management. The natural key is the company name.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};
use validator::Validate;

use crate::crm::{Company, CreateCompanyRequest, UpdateCompanyRequest};
use crate::errors::{Error, Result};
use crate::services::lifecycle::{merge, merge_opt, LifecycleHooks, LifecycleService};
use crate::storage::repositories::CompanyRepository;

pub struct CompanyHooks {
    repository: Arc<dyn CompanyRepository>,
}

#[async_trait]
impl LifecycleHooks<Company> for CompanyHooks {
    async fn find_conflict(&self, candidate: &Company) -> Result<Option<String>> {
        Ok(self.repository.find_by_name(&candidate.name).await?.map(|existing| existing.name))
    }
}

pub struct CompanyService {
    engine: LifecycleService<Company, CompanyHooks>,
    repository: Arc<dyn CompanyRepository>,
}

impl CompanyService {
    pub fn new<R>(repository: Arc<R>) -> Self
    where
        R: CompanyRepository + 'static,
    {
        let hooks = CompanyHooks { repository: repository.clone() };
        Self { engine: LifecycleService::new(repository.clone(), hooks), repository }
    }

    #[instrument(skip(self, request), fields(company_name = %request.name))]
    pub async fn create(&self, request: CreateCompanyRequest) -> Result<Company> {
        request.validate()?;
        let company = self.engine.create(request.into()).await?;
        info!(company_id = %company.id, "company created");
        Ok(company)
    }

    pub async fn get(&self, id: &str) -> Result<Company> {
        self.engine.get(id).await
    }

    pub async fn list(&self) -> Result<Vec<Company>> {
        self.engine.list().await
    }

    pub async fn delete(&self, id: &str) -> Result<Company> {
        self.engine.delete(id).await
    }

    #[instrument(skip(self, request), fields(company_id = %id))]
    pub async fn update(&self, id: &str, request: UpdateCompanyRequest) -> Result<Company> {
        request.validate()?;
        let mut company = self.engine.get(id).await?;

        if let Some(name) = &request.name {
            if *name != company.name {
                if let Some(existing) = self.repository.find_by_name(name).await? {
                    if existing.id != company.id {
                        return Err(Error::already_exists("Company", name.clone()));
                    }
                }
            }
        }

        merge(&mut company.name, request.name);
        merge_opt(&mut company.industry, request.industry);
        merge_opt(&mut company.website, request.website);
        merge_opt(&mut company.address, request.address);

        self.engine.persist_update(&mut company).await?;
        info!(company_id = %company.id, "company updated");
        Ok(company)
    }
}
