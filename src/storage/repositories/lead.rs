//! Lead repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

use crate::crm::{Lead, LeadStatus};
use crate::domain::LeadId;
use crate::errors::{map_constraint_violation, Error, Result};
use crate::services::lifecycle::EntityStore;
use crate::storage::DbPool;

#[derive(Debug, Clone, FromRow)]
struct LeadRow {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub status: String,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str =
    "id, full_name, email, phone, company_name, status, source, notes, created_at, updated_at";

#[async_trait]
pub trait LeadRepository: EntityStore<Lead> {
    async fn find_by_email(&self, email: &str) -> Result<Option<Lead>>;

    async fn find_by_status(&self, status: LeadStatus) -> Result<Vec<Lead>>;
}

#[derive(Debug, Clone)]
pub struct SqlxLeadRepository {
    pool: DbPool,
}

impl SqlxLeadRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_lead(&self, row: LeadRow) -> Result<Lead> {
        let status = LeadStatus::from_str(&row.status).map_err(|_| {
            Error::internal(format!("Corrupt status column for lead '{}': '{}'", row.id, row.status))
        })?;

        Ok(Lead {
            id: LeadId::from_string(row.id),
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            company_name: row.company_name,
            status,
            source: row.source,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl EntityStore<Lead> for SqlxLeadRepository {
    #[instrument(skip(self), fields(lead_id = %id), name = "db_get_lead")]
    async fn find_by_id(&self, id: &str) -> Result<Option<Lead>> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {} FROM leads WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch lead".to_string(),
        })?;

        row.map(|r| self.row_to_lead(r)).transpose()
    }

    #[instrument(skip(self), name = "db_list_leads")]
    async fn find_all(&self) -> Result<Vec<Lead>> {
        let rows = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {} FROM leads ORDER BY created_at",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to list leads".to_string(),
        })?;

        rows.into_iter().map(|r| self.row_to_lead(r)).collect()
    }

    #[instrument(skip(self, lead), fields(lead_id = %lead.id, lead_email = %lead.email), name = "db_create_lead")]
    async fn insert(&self, lead: &Lead) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO leads (id, full_name, email, phone, company_name, status, source, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(lead.id.as_str())
        .bind(&lead.full_name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.company_name)
        .bind(lead.status.as_str())
        .bind(&lead.source)
        .bind(&lead.notes)
        .bind(lead.created_at)
        .bind(lead.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| map_constraint_violation(err, "Lead", &lead.email, "Failed to create lead"))?;

        Ok(())
    }

    #[instrument(skip(self, lead), fields(lead_id = %lead.id), name = "db_update_lead")]
    async fn save(&self, lead: &Lead) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE leads
            SET full_name = $1, email = $2, phone = $3, company_name = $4, status = $5, source = $6, notes = $7, updated_at = $8
            WHERE id = $9
            "#,
        )
        .bind(&lead.full_name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.company_name)
        .bind(lead.status.as_str())
        .bind(&lead.source)
        .bind(&lead.notes)
        .bind(lead.updated_at)
        .bind(lead.id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| map_constraint_violation(err, "Lead", &lead.email, "Failed to update lead"))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("Lead", lead.id.as_str()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(lead_id = %id), name = "db_delete_lead")]
    async fn delete_by_id(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to delete lead".to_string(),
            })?;

        Ok(())
    }
}

#[async_trait]
impl LeadRepository for SqlxLeadRepository {
    #[instrument(skip(self), fields(lead_email = %email), name = "db_get_lead_by_email")]
    async fn find_by_email(&self, email: &str) -> Result<Option<Lead>> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {} FROM leads WHERE email = $1",
            SELECT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch lead by email".to_string(),
        })?;

        row.map(|r| self.row_to_lead(r)).transpose()
    }

    #[instrument(skip(self), fields(status = %status), name = "db_list_leads_by_status")]
    async fn find_by_status(&self, status: LeadStatus) -> Result<Vec<Lead>> {
        let rows = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {} FROM leads WHERE status = $1 ORDER BY created_at",
            SELECT_COLUMNS
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to list leads by status".to_string(),
        })?;

        rows.into_iter().map(|r| self.row_to_lead(r)).collect()
    }
}
