//! Security token repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

use crate::auth::token::{SecurityToken, TokenPurpose};
use crate::domain::{TokenId, UserId};
use crate::errors::{map_constraint_violation, Error, Result};
use crate::services::lifecycle::EntityStore;
use crate::storage::DbPool;

#[derive(Debug, Clone, FromRow)]
struct SecurityTokenRow {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub purpose: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str = "id, user_id, token, purpose, expires_at, created_at, updated_at";

#[async_trait]
pub trait SecurityTokenRepository: EntityStore<SecurityToken> {
    /// Look up by the opaque secret value.
    async fn find_by_token(&self, token: &str) -> Result<Option<SecurityToken>>;

    /// All tokens for one account and purpose, newest first. Liveness is the
    /// caller's concern; expired rows are returned too.
    async fn find_by_user_and_purpose(
        &self,
        user_id: &UserId,
        purpose: TokenPurpose,
    ) -> Result<Vec<SecurityToken>>;
}

#[derive(Debug, Clone)]
pub struct SqlxSecurityTokenRepository {
    pool: DbPool,
}

impl SqlxSecurityTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_token(&self, row: SecurityTokenRow) -> Result<SecurityToken> {
        let purpose = TokenPurpose::from_str(&row.purpose).map_err(|_| {
            Error::internal(format!(
                "Corrupt purpose column for token '{}': '{}'",
                row.id, row.purpose
            ))
        })?;

        Ok(SecurityToken {
            id: TokenId::from_string(row.id),
            user_id: UserId::from_string(row.user_id),
            token: row.token,
            purpose,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl EntityStore<SecurityToken> for SqlxSecurityTokenRepository {
    #[instrument(skip(self), fields(token_id = %id), name = "db_get_security_token")]
    async fn find_by_id(&self, id: &str) -> Result<Option<SecurityToken>> {
        let row = sqlx::query_as::<_, SecurityTokenRow>(&format!(
            "SELECT {} FROM security_tokens WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch security token".to_string(),
        })?;

        row.map(|r| self.row_to_token(r)).transpose()
    }

    #[instrument(skip(self), name = "db_list_security_tokens")]
    async fn find_all(&self) -> Result<Vec<SecurityToken>> {
        let rows = sqlx::query_as::<_, SecurityTokenRow>(&format!(
            "SELECT {} FROM security_tokens ORDER BY created_at",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to list security tokens".to_string(),
        })?;

        rows.into_iter().map(|r| self.row_to_token(r)).collect()
    }

    #[instrument(skip(self, token), fields(token_id = %token.id, user_id = %token.user_id), name = "db_create_security_token")]
    async fn insert(&self, token: &SecurityToken) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO security_tokens (id, user_id, token, purpose, expires_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(token.id.as_str())
        .bind(token.user_id.as_str())
        .bind(&token.token)
        .bind(token.purpose.as_str())
        .bind(token.expires_at)
        .bind(token.created_at)
        .bind(token.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            map_constraint_violation(err, "SecurityToken", &token.token, "Failed to create security token")
        })?;

        Ok(())
    }

    #[instrument(skip(self, token), fields(token_id = %token.id), name = "db_update_security_token")]
    async fn save(&self, token: &SecurityToken) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE security_tokens
            SET expires_at = $1, updated_at = $2
            WHERE id = $3
            "#,
        )
        .bind(token.expires_at)
        .bind(token.updated_at)
        .bind(token.id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to update security token".to_string(),
        })?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("SecurityToken", token.id.as_str()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(token_id = %id), name = "db_delete_security_token")]
    async fn delete_by_id(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM security_tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to delete security token".to_string(),
            })?;

        Ok(())
    }
}

#[async_trait]
impl SecurityTokenRepository for SqlxSecurityTokenRepository {
    #[instrument(skip(self, token), name = "db_get_security_token_by_value")]
    async fn find_by_token(&self, token: &str) -> Result<Option<SecurityToken>> {
        let row = sqlx::query_as::<_, SecurityTokenRow>(&format!(
            "SELECT {} FROM security_tokens WHERE token = $1",
            SELECT_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch security token by value".to_string(),
        })?;

        row.map(|r| self.row_to_token(r)).transpose()
    }

    #[instrument(skip(self), fields(user_id = %user_id, purpose = %purpose), name = "db_list_security_tokens_for_user")]
    async fn find_by_user_and_purpose(
        &self,
        user_id: &UserId,
        purpose: TokenPurpose,
    ) -> Result<Vec<SecurityToken>> {
        let rows = sqlx::query_as::<_, SecurityTokenRow>(&format!(
            "SELECT {} FROM security_tokens WHERE user_id = $1 AND purpose = $2 ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(user_id.as_str())
        .bind(purpose.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to list security tokens for user".to_string(),
        })?;

        rows.into_iter().map(|r| self.row_to_token(r)).collect()
    }
}
