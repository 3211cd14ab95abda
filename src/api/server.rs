//! HTTP server bootstrap: wire repositories and services, bind, serve.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::api::routes::{build_router, ApiState};
use crate::auth::{AccountService, AuthenticationService, JwtService, TokenService};
use crate::config::AppConfig;
use crate::errors::{Error, Result};
use crate::services::{ClientService, CompanyService, InteractionService, LeadService};
use crate::storage::repositories::{
    SqlxClientRepository, SqlxCompanyRepository, SqlxInteractionRepository, SqlxLeadRepository,
    SqlxSecurityTokenRepository, SqlxUserAccountRepository,
};
use crate::storage::DbPool;

/// Assemble the handler state from a database pool and configuration.
pub fn build_state(pool: DbPool, config: &AppConfig) -> ApiState {
    let users = Arc::new(SqlxUserAccountRepository::new(pool.clone()));
    let tokens = Arc::new(SqlxSecurityTokenRepository::new(pool.clone()));
    let leads = Arc::new(SqlxLeadRepository::new(pool.clone()));
    let clients = Arc::new(SqlxClientRepository::new(pool.clone()));
    let companies = Arc::new(SqlxCompanyRepository::new(pool.clone()));
    let interactions = Arc::new(SqlxInteractionRepository::new(pool));

    let token_service = Arc::new(TokenService::new(tokens, &config.auth));
    let account_service =
        Arc::new(AccountService::new(users.clone(), token_service, config.auth.clone()));
    let auth_service =
        Arc::new(AuthenticationService::new(users.clone(), JwtService::new(&config.auth)));

    ApiState {
        accounts: account_service,
        auth: auth_service,
        leads: Arc::new(LeadService::new(leads.clone())),
        clients: Arc::new(ClientService::new(clients, users)),
        companies: Arc::new(CompanyService::new(companies)),
        interactions: Arc::new(InteractionService::new(interactions, leads)),
    }
}

/// Bind the configured address and serve until the process is stopped.
pub async fn run_server(pool: DbPool, config: AppConfig) -> Result<()> {
    let addr = config.server.bind_address();
    let state = build_state(pool, &config);
    let router = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|err| Error::config(format!("Failed to bind {}: {}", addr, err)))?;

    info!(%addr, "API server listening");
    axum::serve(listener, router)
        .await
        .map_err(|err| Error::internal(format!("API server terminated: {}", err)))
}
