//! User account repository.
//!
//! Roles are stored as a JSON array in a TEXT column; `row_to_account`
//! decodes it and insert/save re-encode. A unique index on `email` backs the
//! service-level duplicate check against concurrent inserts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;

use crate::auth::account::UserAccount;
use crate::domain::UserId;
use crate::errors::{map_constraint_violation, Error, Result};
use crate::services::lifecycle::EntityStore;
use crate::storage::DbPool;

#[derive(Debug, Clone, FromRow)]
struct UserAccountRow {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: String, // JSON array stored as string
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str =
    "id, full_name, email, password_hash, roles, active, created_at, updated_at";

#[async_trait]
pub trait UserAccountRepository: EntityStore<UserAccount> {
    /// Look up by normalized email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>>;
}

#[derive(Debug, Clone)]
pub struct SqlxUserAccountRepository {
    pool: DbPool,
}

impl SqlxUserAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_account(&self, row: UserAccountRow) -> Result<UserAccount> {
        let roles: Vec<String> = serde_json::from_str(&row.roles).map_err(|err| {
            Error::internal(format!("Corrupt roles column for user '{}': {}", row.id, err))
        })?;

        Ok(UserAccount {
            id: UserId::from_string(row.id),
            full_name: row.full_name,
            email: row.email,
            password_hash: row.password_hash,
            roles,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn roles_json(roles: &[String]) -> Result<String> {
        serde_json::to_string(roles)
            .map_err(|err| Error::internal(format!("Failed to encode roles: {}", err)))
    }
}

#[async_trait]
impl EntityStore<UserAccount> for SqlxUserAccountRepository {
    #[instrument(skip(self), fields(user_id = %id), name = "db_get_user_account")]
    async fn find_by_id(&self, id: &str) -> Result<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserAccountRow>(&format!(
            "SELECT {} FROM user_accounts WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch user account".to_string(),
        })?;

        row.map(|r| self.row_to_account(r)).transpose()
    }

    #[instrument(skip(self), name = "db_list_user_accounts")]
    async fn find_all(&self) -> Result<Vec<UserAccount>> {
        let rows = sqlx::query_as::<_, UserAccountRow>(&format!(
            "SELECT {} FROM user_accounts ORDER BY created_at",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to list user accounts".to_string(),
        })?;

        rows.into_iter().map(|r| self.row_to_account(r)).collect()
    }

    #[instrument(skip(self, account), fields(user_id = %account.id, user_email = %account.email), name = "db_create_user_account")]
    async fn insert(&self, account: &UserAccount) -> Result<()> {
        let roles = Self::roles_json(&account.roles)?;

        sqlx::query(
            r#"
            INSERT INTO user_accounts (id, full_name, email, password_hash, roles, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(account.id.as_str())
        .bind(&account.full_name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&roles)
        .bind(account.active)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            map_constraint_violation(
                err,
                "UserAccount",
                &account.email,
                "Failed to create user account",
            )
        })?;

        Ok(())
    }

    #[instrument(skip(self, account), fields(user_id = %account.id), name = "db_update_user_account")]
    async fn save(&self, account: &UserAccount) -> Result<()> {
        let roles = Self::roles_json(&account.roles)?;

        let result = sqlx::query(
            r#"
            UPDATE user_accounts
            SET full_name = $1, email = $2, password_hash = $3, roles = $4, active = $5, updated_at = $6
            WHERE id = $7
            "#,
        )
        .bind(&account.full_name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&roles)
        .bind(account.active)
        .bind(account.updated_at)
        .bind(account.id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| {
            map_constraint_violation(
                err,
                "UserAccount",
                &account.email,
                "Failed to update user account",
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("UserAccount", account.id.as_str()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_delete_user_account")]
    async fn delete_by_id(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM user_accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to delete user account".to_string(),
            })?;

        Ok(())
    }
}

#[async_trait]
impl UserAccountRepository for SqlxUserAccountRepository {
    #[instrument(skip(self), fields(user_email = %email), name = "db_get_user_account_by_email")]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserAccountRow>(&format!(
            "SELECT {} FROM user_accounts WHERE email = $1",
            SELECT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch user account by email".to_string(),
        })?;

        row.map(|r| self.row_to_account(r)).transpose()
    }
}
