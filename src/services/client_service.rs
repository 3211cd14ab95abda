//! Client management, including CSM/SA staff assignment rules.
//!
//! A client may carry a client success manager and a solutions architect.
//! The nominated account must exist and hold the matching role, and one
//! person can never fill both slots on the same client. The checks run
//! against the post-merge assignment so an update that changes only one slot
//! is still validated against the other.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};
use validator::Validate;

use crate::auth::validation::normalize_email;
use crate::crm::{Client, CreateClientRequest, UpdateClientRequest};
use crate::domain::{CompanyId, UserId};
use crate::errors::{Error, Result};
use crate::services::lifecycle::{merge, merge_opt, LifecycleHooks, LifecycleService};
use crate::storage::repositories::{ClientRepository, UserAccountRepository};

pub const CSM_ROLE: &str = "CSM";
pub const SA_ROLE: &str = "SA";

/// Clients are unique by normalized email.
pub struct ClientHooks {
    repository: Arc<dyn ClientRepository>,
}

#[async_trait]
impl LifecycleHooks<Client> for ClientHooks {
    async fn find_conflict(&self, candidate: &Client) -> Result<Option<String>> {
        Ok(self.repository.find_by_email(&candidate.email).await?.map(|existing| existing.email))
    }
}

pub struct ClientService {
    engine: LifecycleService<Client, ClientHooks>,
    repository: Arc<dyn ClientRepository>,
    accounts: Arc<dyn UserAccountRepository>,
}

impl ClientService {
    pub fn new<R, A>(repository: Arc<R>, accounts: Arc<A>) -> Self
    where
        R: ClientRepository + 'static,
        A: UserAccountRepository + 'static,
    {
        let hooks = ClientHooks { repository: repository.clone() };
        Self { engine: LifecycleService::new(repository.clone(), hooks), repository, accounts }
    }

    async fn check_assignment_role(&self, user_id: &UserId, role: &str) -> Result<()> {
        let account = self
            .accounts
            .find_by_id(user_id.as_str())
            .await?
            .ok_or_else(|| Error::not_found("UserAccount", user_id.as_str()))?;

        if !account.has_role(role) {
            return Err(Error::RoleRequirementNotMet {
                role: role.to_string(),
                user_id: user_id.as_str().to_string(),
                full_name: account.full_name,
                actual_roles: account.roles,
            });
        }
        Ok(())
    }

    /// Validate the CSM/SA pairing as it would be stored. `assigned_role`
    /// names the slot this operation is assigning; a same-user conflict is
    /// reported against that slot.
    async fn check_assignments(
        &self,
        csm_id: Option<&UserId>,
        sa_id: Option<&UserId>,
        assigned_role: &str,
    ) -> Result<()> {
        if let (Some(csm), Some(sa)) = (csm_id, sa_id) {
            if csm == sa {
                return Err(Error::RoleConflict {
                    role: assigned_role.to_string(),
                    user_id: csm.as_str().to_string(),
                });
            }
        }
        if let Some(csm) = csm_id {
            self.check_assignment_role(csm, CSM_ROLE).await?;
        }
        if let Some(sa) = sa_id {
            self.check_assignment_role(sa, SA_ROLE).await?;
        }
        Ok(())
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create(&self, request: CreateClientRequest) -> Result<Client> {
        request.validate()?;
        let client: Client = request.into();

        // On create both slots arrive together; the CSM assignment is
        // considered first.
        self.check_assignments(client.csm_id.as_ref(), client.sa_id.as_ref(), CSM_ROLE).await?;

        let created = self.engine.create(client).await?;
        info!(client_id = %created.id, "client created");
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> Result<Client> {
        self.engine.get(id).await
    }

    pub async fn list(&self) -> Result<Vec<Client>> {
        self.engine.list().await
    }

    pub async fn delete(&self, id: &str) -> Result<Client> {
        self.engine.delete(id).await
    }

    #[instrument(skip(self, request), fields(client_id = %id))]
    pub async fn update(&self, id: &str, request: UpdateClientRequest) -> Result<Client> {
        request.validate()?;
        let mut client = self.engine.get(id).await?;

        let assigned_role =
            if request.sa_id.is_some() && request.csm_id.is_none() { SA_ROLE } else { CSM_ROLE };

        if let Some(email) = &request.email {
            let normalized = normalize_email(email);
            if normalized != client.email {
                if let Some(existing) = self.repository.find_by_email(&normalized).await? {
                    if existing.id != client.id {
                        return Err(Error::already_exists("Client", normalized));
                    }
                }
                client.email = normalized;
            }
        }

        merge(&mut client.full_name, request.full_name);
        merge_opt(&mut client.phone, request.phone);
        merge_opt(&mut client.company_id, request.company_id.map(CompanyId::from_string));
        merge_opt(&mut client.csm_id, request.csm_id.map(UserId::from_string));
        merge_opt(&mut client.sa_id, request.sa_id.map(UserId::from_string));
        merge_opt(&mut client.notes, request.notes);

        self.check_assignments(client.csm_id.as_ref(), client.sa_id.as_ref(), assigned_role)
            .await?;

        self.engine.persist_update(&mut client).await?;
        info!(client_id = %client.id, "client updated");
        Ok(client)
    }
}
