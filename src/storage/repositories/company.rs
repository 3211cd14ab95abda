//! Company repository. The unique index on `name` backs the duplicate check.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;

use crate::crm::Company;
use crate::domain::CompanyId;
use crate::errors::{map_constraint_violation, Error, Result};
use crate::services::lifecycle::EntityStore;
use crate::storage::DbPool;

#[derive(Debug, Clone, FromRow)]
struct CompanyRow {
    pub id: String,
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str = "id, name, industry, website, address, created_at, updated_at";

#[async_trait]
pub trait CompanyRepository: EntityStore<Company> {
    async fn find_by_name(&self, name: &str) -> Result<Option<Company>>;
}

#[derive(Debug, Clone)]
pub struct SqlxCompanyRepository {
    pool: DbPool,
}

impl SqlxCompanyRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_company(&self, row: CompanyRow) -> Company {
        Company {
            id: CompanyId::from_string(row.id),
            name: row.name,
            industry: row.industry,
            website: row.website,
            address: row.address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl EntityStore<Company> for SqlxCompanyRepository {
    #[instrument(skip(self), fields(company_id = %id), name = "db_get_company")]
    async fn find_by_id(&self, id: &str) -> Result<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(&format!(
            "SELECT {} FROM companies WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch company".to_string(),
        })?;

        Ok(row.map(|r| self.row_to_company(r)))
    }

    #[instrument(skip(self), name = "db_list_companies")]
    async fn find_all(&self) -> Result<Vec<Company>> {
        let rows = sqlx::query_as::<_, CompanyRow>(&format!(
            "SELECT {} FROM companies ORDER BY name",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to list companies".to_string(),
        })?;

        Ok(rows.into_iter().map(|r| self.row_to_company(r)).collect())
    }

    #[instrument(skip(self, company), fields(company_id = %company.id, company_name = %company.name), name = "db_create_company")]
    async fn insert(&self, company: &Company) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO companies (id, name, industry, website, address, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(company.id.as_str())
        .bind(&company.name)
        .bind(&company.industry)
        .bind(&company.website)
        .bind(&company.address)
        .bind(company.created_at)
        .bind(company.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            map_constraint_violation(err, "Company", &company.name, "Failed to create company")
        })?;

        Ok(())
    }

    #[instrument(skip(self, company), fields(company_id = %company.id), name = "db_update_company")]
    async fn save(&self, company: &Company) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE companies
            SET name = $1, industry = $2, website = $3, address = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(&company.name)
        .bind(&company.industry)
        .bind(&company.website)
        .bind(&company.address)
        .bind(company.updated_at)
        .bind(company.id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| {
            map_constraint_violation(err, "Company", &company.name, "Failed to update company")
        })?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("Company", company.id.as_str()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(company_id = %id), name = "db_delete_company")]
    async fn delete_by_id(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to delete company".to_string(),
            })?;

        Ok(())
    }
}

#[async_trait]
impl CompanyRepository for SqlxCompanyRepository {
    #[instrument(skip(self), fields(company_name = %name), name = "db_get_company_by_name")]
    async fn find_by_name(&self, name: &str) -> Result<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(&format!(
            "SELECT {} FROM companies WHERE name = $1",
            SELECT_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch company by name".to_string(),
        })?;

        Ok(row.map(|r| self.row_to_company(r)))
    }
}
