//! Account management: registration, sparse updates, password reset and
//! activation flows, role queries.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::auth::account::{CreateAccountRequest, UpdateAccountRequest, UserAccount};
use crate::auth::hashing::hash_password;
use crate::auth::token::TokenPurpose;
use crate::auth::token_service::TokenService;
use crate::auth::validation::{
    normalize_email, validate_email, validate_full_name, validate_password,
};
use crate::config::AuthConfig;
use crate::domain::UserId;
use crate::errors::{Error, Result};
use crate::services::lifecycle::{merge, LifecycleHooks, LifecycleService};
use crate::storage::repositories::UserAccountRepository;

/// Duplicate check for account creation: the natural key is the normalized
/// email address.
pub struct AccountHooks {
    repository: Arc<dyn UserAccountRepository>,
}

#[async_trait]
impl LifecycleHooks<UserAccount> for AccountHooks {
    async fn find_conflict(&self, candidate: &UserAccount) -> Result<Option<String>> {
        Ok(self
            .repository
            .find_by_email(&candidate.email)
            .await?
            .map(|existing| existing.email))
    }
}

pub struct AccountService {
    engine: LifecycleService<UserAccount, AccountHooks>,
    repository: Arc<dyn UserAccountRepository>,
    tokens: Arc<TokenService>,
    config: AuthConfig,
}

impl AccountService {
    pub fn new<R>(repository: Arc<R>, tokens: Arc<TokenService>, config: AuthConfig) -> Self
    where
        R: UserAccountRepository + 'static,
    {
        let hooks = AccountHooks { repository: repository.clone() };
        Self {
            engine: LifecycleService::new(repository.clone(), hooks),
            repository,
            tokens,
            config,
        }
    }

    fn check_password_pair(
        &self,
        password: &str,
        confirmation: &str,
        identifier: &str,
        full_name: &str,
    ) -> Result<()> {
        if password != confirmation {
            return Err(Error::password_mismatch(identifier, full_name));
        }
        validate_password(password, self.config.min_password_length)
    }

    /// Register a new account. The password pair must match and meet the
    /// configured minimum; the account starts active with the base role.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create(&self, request: CreateAccountRequest) -> Result<UserAccount> {
        validate_full_name(&request.full_name)?;
        validate_email(&request.email)?;
        let email = normalize_email(&request.email);

        self.check_password_pair(
            &request.password,
            &request.password_confirmation,
            &email,
            &request.full_name,
        )?;

        let now = Utc::now();
        let account = UserAccount {
            id: UserId::new(),
            full_name: request.full_name,
            email,
            password_hash: hash_password(&request.password)?,
            roles: vec![self.config.base_role.clone()],
            active: true,
            created_at: now,
            updated_at: now,
        };

        let created = self.engine.create(account).await?;
        info!(user_id = %created.id, "account created");
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> Result<UserAccount> {
        self.engine.get(id).await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        self.repository.find_by_email(&normalize_email(email)).await
    }

    pub async fn list(&self) -> Result<Vec<UserAccount>> {
        self.engine.list().await
    }

    pub async fn delete(&self, id: &str) -> Result<UserAccount> {
        self.engine.delete(id).await
    }

    /// Sparse update: absent fields keep their stored values. A changed
    /// email is re-validated and checked for conflicts; a new password
    /// requires a matching confirmation and minimum length.
    #[instrument(skip(self, request), fields(user_id = %id))]
    pub async fn update(&self, id: &str, request: UpdateAccountRequest) -> Result<UserAccount> {
        let mut account = self.engine.get(id).await?;

        if let Some(full_name) = &request.full_name {
            validate_full_name(full_name)?;
        }

        if let Some(email) = &request.email {
            validate_email(email)?;
            let normalized = normalize_email(email);
            if normalized != account.email {
                if let Some(existing) = self.repository.find_by_email(&normalized).await? {
                    if existing.id != account.id {
                        return Err(Error::already_exists("UserAccount", normalized));
                    }
                }
                account.email = normalized;
            }
        }

        if let Some(password) = &request.password {
            let confirmation = request.password_confirmation.as_deref().unwrap_or("");
            self.check_password_pair(password, confirmation, &account.email, &account.full_name)?;
            account.password_hash = hash_password(password)?;
        }

        if request.roles.is_some() {
            // TODO: honor the requested role list; today any roles payload
            // resets the account to just the base role, matching the legacy
            // admin console which only ever sent the full default set.
            account.roles = vec![self.config.base_role.clone()];
        }

        merge(&mut account.full_name, request.full_name);
        merge(&mut account.active, request.active);

        self.engine.persist_update(&mut account).await?;
        info!(user_id = %account.id, "account updated");
        Ok(account)
    }

    /// Issue a security token for the account owning `email`. An unknown
    /// email is a distinct error so callers can report which address failed.
    #[instrument(skip(self), fields(purpose = %purpose))]
    pub async fn create_token(
        &self,
        email: &str,
        purpose: TokenPurpose,
        ttl_minutes: Option<i64>,
    ) -> Result<crate::auth::token::SecurityToken> {
        let normalized = normalize_email(email);
        let account = self
            .repository
            .find_by_email(&normalized)
            .await?
            .ok_or_else(|| Error::TokenEmailNotFound {
                purpose: purpose.to_string(),
                email: normalized.clone(),
            })?;

        self.tokens.issue(&account.id, purpose, ttl_minutes).await
    }

    /// Complete a password reset. The expired token is reported but left in
    /// place, and a failed confirmation leaves the stored password untouched.
    #[instrument(skip(self, token, password, confirmation))]
    pub async fn confirm_reset_password(
        &self,
        token: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<UserAccount> {
        let stored =
            self.tokens.find_by_token(token).await?.ok_or_else(|| Error::ResetTokenNotFound {
                token: token.to_string(),
            })?;

        let now = Utc::now();
        if !stored.is_valid_at(now) {
            warn!(token_id = %stored.id, "password reset attempted with expired token");
            return Err(Error::ResetTokenExpired {
                token: token.to_string(),
                expired_at: stored.expires_at,
            });
        }

        let mut account = self.engine.get(stored.user_id.as_str()).await?;
        self.check_password_pair(password, confirmation, &account.email, &account.full_name)?;

        account.password_hash = hash_password(password)?;
        self.engine.persist_update(&mut account).await?;
        self.tokens.consume(token).await?;

        info!(user_id = %account.id, "password reset completed");
        Ok(account)
    }

    /// Complete an account activation: mark the account active and consume
    /// the token. Activating an already-active account is harmless.
    #[instrument(skip(self, token))]
    pub async fn confirm_activation(&self, token: &str) -> Result<UserAccount> {
        let stored =
            self.tokens.find_by_token(token).await?.ok_or_else(|| Error::ResetTokenNotFound {
                token: token.to_string(),
            })?;

        let now = Utc::now();
        if !stored.is_valid_at(now) {
            return Err(Error::ResetTokenExpired {
                token: token.to_string(),
                expired_at: stored.expires_at,
            });
        }

        let mut account = self.engine.get(stored.user_id.as_str()).await?;
        account.active = true;
        self.engine.persist_update(&mut account).await?;
        self.tokens.consume(token).await?;

        info!(user_id = %account.id, "account activated");
        Ok(account)
    }

    /// Active accounts holding at least one of the given roles. An empty
    /// role list is a caller error, not an empty result.
    #[instrument(skip(self))]
    pub async fn find_all_by_role(&self, roles: &[String]) -> Result<Vec<UserAccount>> {
        if roles.is_empty() {
            return Err(Error::validation_field("At least one role must be given", "roles"));
        }

        let accounts = self.engine.list().await?;
        Ok(accounts
            .into_iter()
            .filter(|account| account.active && roles.iter().any(|role| account.has_role(role)))
            .collect())
    }
}
