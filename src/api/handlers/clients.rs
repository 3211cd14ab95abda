//! Client endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::instrument;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::crm::{ClientResponse, CreateClientRequest, UpdateClientRequest};

#[utoipa::path(
    post,
    path = "/api/v1/clients",
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client created", body = ClientResponse),
        (status = 400, description = "Validation error or assignment rule violation")
    ),
    security(("bearer_auth" = [])),
    tag = "clients"
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn create_client(
    State(state): State<ApiState>,
    Json(payload): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    let client = state.clients.create(payload).await?;
    Ok((StatusCode::CREATED, Json(client.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients",
    responses((status = 200, description = "All clients", body = [ClientResponse])),
    security(("bearer_auth" = [])),
    tag = "clients"
)]
#[instrument(skip(state))]
pub async fn list_clients(
    State(state): State<ApiState>,
) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    let clients = state.clients.list().await?;
    Ok(Json(clients.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}",
    params(("id" = String, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client found", body = ClientResponse),
        (status = 404, description = "No such client")
    ),
    security(("bearer_auth" = [])),
    tag = "clients"
)]
#[instrument(skip(state))]
pub async fn get_client(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<ClientResponse>, ApiError> {
    let client = state.clients.get(&id).await?;
    Ok(Json(client.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/clients/{id}",
    params(("id" = String, Path, description = "Client id")),
    request_body = UpdateClientRequest,
    responses(
        (status = 200, description = "Client updated", body = ClientResponse),
        (status = 400, description = "Assignment rule violation"),
        (status = 404, description = "No such client")
    ),
    security(("bearer_auth" = [])),
    tag = "clients"
)]
#[instrument(skip(state, payload))]
pub async fn update_client(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateClientRequest>,
) -> Result<Json<ClientResponse>, ApiError> {
    let client = state.clients.update(&id, payload).await?;
    Ok(Json(client.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/clients/{id}",
    params(("id" = String, Path, description = "Client id")),
    responses(
        (status = 200, description = "Removed client", body = ClientResponse),
        (status = 404, description = "No such client")
    ),
    security(("bearer_auth" = [])),
    tag = "clients"
)]
#[instrument(skip(state))]
pub async fn delete_client(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<ClientResponse>, ApiError> {
    let client = state.clients.delete(&id).await?;
    Ok(Json(client.into()))
}
