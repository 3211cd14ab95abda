//! Client repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;

use crate::crm::Client;
use crate::domain::{ClientId, CompanyId, UserId};
use crate::errors::{map_constraint_violation, Error, Result};
use crate::services::lifecycle::EntityStore;
use crate::storage::DbPool;

#[derive(Debug, Clone, FromRow)]
struct ClientRow {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company_id: Option<String>,
    pub csm_id: Option<String>,
    pub sa_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str =
    "id, full_name, email, phone, company_id, csm_id, sa_id, notes, created_at, updated_at";

#[async_trait]
pub trait ClientRepository: EntityStore<Client> {
    async fn find_by_email(&self, email: &str) -> Result<Option<Client>>;
}

#[derive(Debug, Clone)]
pub struct SqlxClientRepository {
    pool: DbPool,
}

impl SqlxClientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_client(&self, row: ClientRow) -> Client {
        Client {
            id: ClientId::from_string(row.id),
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            company_id: row.company_id.map(CompanyId::from_string),
            csm_id: row.csm_id.map(UserId::from_string),
            sa_id: row.sa_id.map(UserId::from_string),
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl EntityStore<Client> for SqlxClientRepository {
    #[instrument(skip(self), fields(client_id = %id), name = "db_get_client")]
    async fn find_by_id(&self, id: &str) -> Result<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {} FROM clients WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch client".to_string(),
        })?;

        Ok(row.map(|r| self.row_to_client(r)))
    }

    #[instrument(skip(self), name = "db_list_clients")]
    async fn find_all(&self) -> Result<Vec<Client>> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {} FROM clients ORDER BY created_at",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to list clients".to_string(),
        })?;

        Ok(rows.into_iter().map(|r| self.row_to_client(r)).collect())
    }

    #[instrument(skip(self, client), fields(client_id = %client.id, client_email = %client.email), name = "db_create_client")]
    async fn insert(&self, client: &Client) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO clients (id, full_name, email, phone, company_id, csm_id, sa_id, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(client.id.as_str())
        .bind(&client.full_name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(client.company_id.as_ref().map(CompanyId::as_str))
        .bind(client.csm_id.as_ref().map(UserId::as_str))
        .bind(client.sa_id.as_ref().map(UserId::as_str))
        .bind(&client.notes)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            map_constraint_violation(err, "Client", &client.email, "Failed to create client")
        })?;

        Ok(())
    }

    #[instrument(skip(self, client), fields(client_id = %client.id), name = "db_update_client")]
    async fn save(&self, client: &Client) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET full_name = $1, email = $2, phone = $3, company_id = $4, csm_id = $5, sa_id = $6, notes = $7, updated_at = $8
            WHERE id = $9
            "#,
        )
        .bind(&client.full_name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(client.company_id.as_ref().map(CompanyId::as_str))
        .bind(client.csm_id.as_ref().map(UserId::as_str))
        .bind(client.sa_id.as_ref().map(UserId::as_str))
        .bind(&client.notes)
        .bind(client.updated_at)
        .bind(client.id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| {
            map_constraint_violation(err, "Client", &client.email, "Failed to update client")
        })?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("Client", client.id.as_str()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(client_id = %id), name = "db_delete_client")]
    async fn delete_by_id(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to delete client".to_string(),
            })?;

        Ok(())
    }
}

#[async_trait]
impl ClientRepository for SqlxClientRepository {
    #[instrument(skip(self), fields(client_email = %email), name = "db_get_client_by_email")]
    async fn find_by_email(&self, email: &str) -> Result<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {} FROM clients WHERE email = $1",
            SELECT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch client by email".to_string(),
        })?;

        Ok(row.map(|r| self.row_to_client(r)))
    }
}
