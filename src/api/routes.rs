//! Router assembly and shared handler state.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::auth::middleware::require_auth;
use crate::auth::{AccountService, AuthenticationService};
use crate::services::{ClientService, CompanyService, InteractionService, LeadService};

#[derive(Clone)]
pub struct ApiState {
    pub accounts: Arc<AccountService>,
    pub auth: Arc<AuthenticationService>,
    pub leads: Arc<LeadService>,
    pub clients: Arc<ClientService>,
    pub companies: Arc<CompanyService>,
    pub interactions: Arc<InteractionService>,
}

/// Build the full application router. Registration, session, token, and
/// health endpoints are public; everything else sits behind bearer
/// authentication.
pub fn build_router(state: ApiState) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/v1/auth/register", post(handlers::auth::register))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/tokens", post(handlers::auth::request_token))
        .route("/api/v1/auth/password-reset", post(handlers::auth::confirm_password_reset))
        .route("/api/v1/auth/activate", post(handlers::auth::confirm_activation));

    let protected = Router::new()
        .route("/api/v1/accounts", post(handlers::users::create_account).get(handlers::users::list_accounts))
        .route(
            "/api/v1/accounts/{id}",
            get(handlers::users::get_account)
                .put(handlers::users::update_account)
                .delete(handlers::users::delete_account),
        )
        .route("/api/v1/accounts/by-role", get(handlers::users::list_accounts_by_role))
        .route("/api/v1/leads", post(handlers::leads::create_lead).get(handlers::leads::list_leads))
        .route(
            "/api/v1/leads/{id}",
            get(handlers::leads::get_lead)
                .put(handlers::leads::update_lead)
                .delete(handlers::leads::delete_lead),
        )
        .route("/api/v1/leads/{id}/interactions", get(handlers::interactions::list_for_lead))
        .route(
            "/api/v1/clients",
            post(handlers::clients::create_client).get(handlers::clients::list_clients),
        )
        .route(
            "/api/v1/clients/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route(
            "/api/v1/companies",
            post(handlers::companies::create_company).get(handlers::companies::list_companies),
        )
        .route(
            "/api/v1/companies/{id}",
            get(handlers::companies::get_company)
                .put(handlers::companies::update_company)
                .delete(handlers::companies::delete_company),
        )
        .route(
            "/api/v1/interactions",
            post(handlers::interactions::create_interaction)
                .get(handlers::interactions::list_interactions),
        )
        .route(
            "/api/v1/interactions/{id}",
            get(handlers::interactions::get_interaction)
                .put(handlers::interactions::update_interaction)
                .delete(handlers::interactions::delete_interaction),
        )
        .layer(middleware::from_fn_with_state(state.auth.clone(), require_auth));

    public
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
