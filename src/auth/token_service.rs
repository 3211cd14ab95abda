//! Security token issuing, validation, and consumption.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use tracing::{debug, instrument};

use crate::auth::token::{SecurityToken, TokenPurpose};
use crate::config::AuthConfig;
use crate::domain::{TokenId, UserId};
use crate::errors::Result;
use crate::services::lifecycle::{LifecycleService, NoHooks};
use crate::storage::repositories::SecurityTokenRepository;

/// Length of the generated secret, alphanumeric characters from the OS RNG.
const TOKEN_SECRET_LENGTH: usize = 48;

pub struct TokenService {
    engine: LifecycleService<SecurityToken, NoHooks>,
    repository: Arc<dyn SecurityTokenRepository>,
    default_ttl_minutes: i64,
}

impl TokenService {
    pub fn new<R>(repository: Arc<R>, config: &AuthConfig) -> Self
    where
        R: SecurityTokenRepository + 'static,
    {
        Self {
            engine: LifecycleService::new(repository.clone(), NoHooks),
            repository,
            default_ttl_minutes: config.token_ttl_minutes,
        }
    }

    fn generate_secret() -> String {
        OsRng
            .sample_iter(&Alphanumeric)
            .take(TOKEN_SECRET_LENGTH)
            .map(char::from)
            .collect()
    }

    /// Issue a token for the account and purpose. When a live token for that
    /// pair already exists the same token is returned instead of minting a
    /// new one, so repeated requests (double-clicked reset emails) reuse one
    /// secret. A missing or non-positive TTL falls back to the configured
    /// default.
    #[instrument(skip(self), fields(user_id = %user_id, purpose = %purpose))]
    pub async fn issue(
        &self,
        user_id: &UserId,
        purpose: TokenPurpose,
        ttl_minutes: Option<i64>,
    ) -> Result<SecurityToken> {
        let now = Utc::now();

        let existing = self.repository.find_by_user_and_purpose(user_id, purpose).await?;
        if let Some(live) = existing.into_iter().find(|t| t.is_valid_at(now)) {
            debug!(token_id = %live.id, "reusing live security token");
            return Ok(live);
        }

        let ttl = ttl_minutes.filter(|minutes| *minutes > 0).unwrap_or(self.default_ttl_minutes);

        let token = SecurityToken {
            id: TokenId::new(),
            user_id: user_id.clone(),
            token: Self::generate_secret(),
            purpose,
            expires_at: now + Duration::minutes(ttl),
            created_at: now,
            updated_at: now,
        };

        self.engine.create(token).await
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<SecurityToken>> {
        self.repository.find_by_token(token).await
    }

    /// A token is valid exactly when it exists and its deadline has not
    /// passed. Expired rows are reported invalid but never removed here.
    #[instrument(skip(self, token))]
    pub async fn is_valid(&self, token: &str) -> Result<bool> {
        let now = Utc::now();
        Ok(self
            .repository
            .find_by_token(token)
            .await?
            .map(|t| t.is_valid_at(now))
            .unwrap_or(false))
    }

    /// Remove the token after use. Consuming an already-absent token is a
    /// no-op so retries of a completed flow do not fail.
    #[instrument(skip(self, token))]
    pub async fn consume(&self, token: &str) -> Result<()> {
        if let Some(stored) = self.repository.find_by_token(token).await? {
            self.engine.store().delete_by_id(stored.id.as_str()).await?;
            debug!(token_id = %stored.id, "security token consumed");
        }
        Ok(())
    }
}
