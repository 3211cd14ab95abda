//! Lead interaction repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

use crate::crm::{InteractionKind, LeadInteraction};
use crate::domain::{InteractionId, LeadId};
use crate::errors::{Error, Result};
use crate::services::lifecycle::EntityStore;
use crate::storage::DbPool;

#[derive(Debug, Clone, FromRow)]
struct InteractionRow {
    pub id: String,
    pub lead_id: String,
    pub kind: String,
    pub summary: String,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str = "id, lead_id, kind, summary, occurred_at, created_at, updated_at";

#[async_trait]
pub trait InteractionRepository: EntityStore<LeadInteraction> {
    /// All interactions for a lead, most recent occurrence first.
    async fn find_by_lead(&self, lead_id: &LeadId) -> Result<Vec<LeadInteraction>>;
}

#[derive(Debug, Clone)]
pub struct SqlxInteractionRepository {
    pool: DbPool,
}

impl SqlxInteractionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_interaction(&self, row: InteractionRow) -> Result<LeadInteraction> {
        let kind = InteractionKind::from_str(&row.kind).map_err(|_| {
            Error::internal(format!(
                "Corrupt kind column for interaction '{}': '{}'",
                row.id, row.kind
            ))
        })?;

        Ok(LeadInteraction {
            id: InteractionId::from_string(row.id),
            lead_id: LeadId::from_string(row.lead_id),
            kind,
            summary: row.summary,
            occurred_at: row.occurred_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl EntityStore<LeadInteraction> for SqlxInteractionRepository {
    #[instrument(skip(self), fields(interaction_id = %id), name = "db_get_interaction")]
    async fn find_by_id(&self, id: &str) -> Result<Option<LeadInteraction>> {
        let row = sqlx::query_as::<_, InteractionRow>(&format!(
            "SELECT {} FROM lead_interactions WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch interaction".to_string(),
        })?;

        row.map(|r| self.row_to_interaction(r)).transpose()
    }

    #[instrument(skip(self), name = "db_list_interactions")]
    async fn find_all(&self) -> Result<Vec<LeadInteraction>> {
        let rows = sqlx::query_as::<_, InteractionRow>(&format!(
            "SELECT {} FROM lead_interactions ORDER BY occurred_at DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to list interactions".to_string(),
        })?;

        rows.into_iter().map(|r| self.row_to_interaction(r)).collect()
    }

    #[instrument(skip(self, interaction), fields(interaction_id = %interaction.id, lead_id = %interaction.lead_id), name = "db_create_interaction")]
    async fn insert(&self, interaction: &LeadInteraction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO lead_interactions (id, lead_id, kind, summary, occurred_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(interaction.id.as_str())
        .bind(interaction.lead_id.as_str())
        .bind(interaction.kind.as_str())
        .bind(&interaction.summary)
        .bind(interaction.occurred_at)
        .bind(interaction.created_at)
        .bind(interaction.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to create interaction".to_string(),
        })?;

        Ok(())
    }

    #[instrument(skip(self, interaction), fields(interaction_id = %interaction.id), name = "db_update_interaction")]
    async fn save(&self, interaction: &LeadInteraction) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE lead_interactions
            SET kind = $1, summary = $2, occurred_at = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(interaction.kind.as_str())
        .bind(&interaction.summary)
        .bind(interaction.occurred_at)
        .bind(interaction.updated_at)
        .bind(interaction.id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to update interaction".to_string(),
        })?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("LeadInteraction", interaction.id.as_str()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(interaction_id = %id), name = "db_delete_interaction")]
    async fn delete_by_id(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM lead_interactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to delete interaction".to_string(),
            })?;

        Ok(())
    }
}

#[async_trait]
impl InteractionRepository for SqlxInteractionRepository {
    #[instrument(skip(self), fields(lead_id = %lead_id), name = "db_list_interactions_for_lead")]
    async fn find_by_lead(&self, lead_id: &LeadId) -> Result<Vec<LeadInteraction>> {
        let rows = sqlx::query_as::<_, InteractionRow>(&format!(
            "SELECT {} FROM lead_interactions WHERE lead_id = $1 ORDER BY occurred_at DESC",
            SELECT_COLUMNS
        ))
        .bind(lead_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to list interactions for lead".to_string(),
        })?;

        rows.into_iter().map(|r| self.row_to_interaction(r)).collect()
    }
}
