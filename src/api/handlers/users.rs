//! Account management endpoints. Bearer authentication required.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::instrument;
use utoipa::IntoParams;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::auth::{AccountResponse, CreateAccountRequest, UpdateAccountRequest};

#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = [])),
    tag = "accounts"
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn create_account(
    State(state): State<ApiState>,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let account = state.accounts.create(payload).await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    responses((status = 200, description = "All accounts", body = [AccountResponse])),
    security(("bearer_auth" = [])),
    tag = "accounts"
)]
#[instrument(skip(state))]
pub async fn list_accounts(
    State(state): State<ApiState>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let accounts = state.accounts.list().await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RolesQuery {
    /// Comma-separated role names, e.g. `CSM,SA`.
    pub roles: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/by-role",
    params(RolesQuery),
    responses(
        (status = 200, description = "Active accounts holding any given role", body = [AccountResponse]),
        (status = 400, description = "Empty role list")
    ),
    security(("bearer_auth" = [])),
    tag = "accounts"
)]
#[instrument(skip(state))]
pub async fn list_accounts_by_role(
    State(state): State<ApiState>,
    Query(query): Query<RolesQuery>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let roles: Vec<String> = query
        .roles
        .split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect();

    let accounts = state.accounts.find_all_by_role(&roles).await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account found", body = AccountResponse),
        (status = 404, description = "No such account")
    ),
    security(("bearer_auth" = [])),
    tag = "accounts"
)]
#[instrument(skip(state))]
pub async fn get_account(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.accounts.get(&id).await?;
    Ok(Json(account.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}",
    params(("id" = String, Path, description = "Account id")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = AccountResponse),
        (status = 404, description = "No such account")
    ),
    security(("bearer_auth" = [])),
    tag = "accounts"
)]
#[instrument(skip(state, payload))]
pub async fn update_account(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAccountRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.accounts.update(&id, payload).await?;
    Ok(Json(account.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{id}",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Removed account", body = AccountResponse),
        (status = 404, description = "No such account")
    ),
    security(("bearer_auth" = [])),
    tag = "accounts"
)]
#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.accounts.delete(&id).await?;
    Ok(Json(account.into()))
}
