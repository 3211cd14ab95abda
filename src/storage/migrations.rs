//! # Database Migration Management
//!
//! Schema evolution using embedded SQL migrations. Migrations are compiled
//! into the binary and executed in order on startup when auto_migrate is
//! enabled; applied versions are tracked in a `schema_migrations` table.

use crate::errors::{Error, Result};
use crate::storage::DbPool;
use sqlx::Row;
use tracing::{debug, info};

/// Ordered list of (version, description, sql) migrations.
const MIGRATIONS: &[(i64, &str, &str)] = &[
    (
        1,
        "create user_accounts",
        r#"
        CREATE TABLE IF NOT EXISTS user_accounts (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            full_name TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            roles TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_user_accounts_email ON user_accounts (email);
        "#,
    ),
    (
        2,
        "create security_tokens",
        r#"
        CREATE TABLE IF NOT EXISTS security_tokens (
            id TEXT PRIMARY KEY,
            token TEXT NOT NULL,
            purpose TEXT NOT NULL,
            user_id TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_security_tokens_token ON security_tokens (token);
        CREATE INDEX IF NOT EXISTS idx_security_tokens_user_purpose
            ON security_tokens (user_id, purpose);
        "#,
    ),
    (
        3,
        "create companies",
        r#"
        CREATE TABLE IF NOT EXISTS companies (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            industry TEXT,
            website TEXT,
            address TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_companies_name ON companies (name);
        "#,
    ),
    (
        4,
        "create clients",
        r#"
        CREATE TABLE IF NOT EXISTS clients (
            id TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            company_id TEXT,
            csm_id TEXT,
            sa_id TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_clients_email ON clients (email);
        "#,
    ),
    (
        5,
        "create leads",
        r#"
        CREATE TABLE IF NOT EXISTS leads (
            id TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            company_name TEXT,
            status TEXT NOT NULL,
            source TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_leads_email ON leads (email);
        CREATE INDEX IF NOT EXISTS idx_leads_status ON leads (status);
        "#,
    ),
    (
        6,
        "create lead_interactions",
        r#"
        CREATE TABLE IF NOT EXISTS lead_interactions (
            id TEXT PRIMARY KEY,
            lead_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            summary TEXT NOT NULL,
            occurred_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_lead_interactions_lead ON lead_interactions (lead_id);
        "#,
    ),
];

/// Run all pending migrations against the given pool.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            installed_on TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| Error::Database {
        source: e,
        context: "Failed to create schema_migrations table".to_string(),
    })?;

    let applied = applied_versions(pool).await?;

    let mut executed = 0usize;
    for (version, description, sql) in MIGRATIONS {
        if applied.contains(version) {
            debug!(version, description, "Migration already applied, skipping");
            continue;
        }

        let mut tx = pool.begin().await.map_err(|e| Error::Database {
            source: e,
            context: format!("Failed to begin transaction for migration {}", version),
        })?;

        // SQLite executes one statement per call; split on ';'
        for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement).execute(&mut *tx).await.map_err(|e| Error::Database {
                source: e,
                context: format!("Migration {} ({}) failed", version, description),
            })?;
        }

        sqlx::query("INSERT INTO schema_migrations (version, description, installed_on) VALUES ($1, $2, $3)")
            .bind(version)
            .bind(description)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::Database {
                source: e,
                context: format!("Failed to record migration {}", version),
            })?;

        tx.commit().await.map_err(|e| Error::Database {
            source: e,
            context: format!("Failed to commit migration {}", version),
        })?;

        info!(version, description, "Applied migration");
        executed += 1;
    }

    if executed == 0 {
        debug!("Database schema already up to date");
    } else {
        info!(count = executed, "Database migrations complete");
    }

    Ok(())
}

/// Fetch the set of already-applied migration versions.
async fn applied_versions(pool: &DbPool) -> Result<std::collections::HashSet<i64>> {
    let rows = sqlx::query("SELECT version FROM schema_migrations")
        .fetch_all(pool)
        .await
        .map_err(|e| Error::Database {
            source: e,
            context: "Failed to read schema_migrations".to_string(),
        })?;

    Ok(rows.into_iter().map(|row| row.get::<i64, _>("version")).collect())
}
