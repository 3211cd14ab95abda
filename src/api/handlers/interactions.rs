//! Interaction endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::instrument;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::crm::{CreateInteractionRequest, InteractionResponse, UpdateInteractionRequest};
use crate::domain::LeadId;

#[utoipa::path(
    post,
    path = "/api/v1/interactions",
    request_body = CreateInteractionRequest,
    responses(
        (status = 201, description = "Interaction recorded", body = InteractionResponse),
        (status = 404, description = "Referenced lead does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "interactions"
)]
#[instrument(skip(state, payload), fields(lead_id = %payload.lead_id))]
pub async fn create_interaction(
    State(state): State<ApiState>,
    Json(payload): Json<CreateInteractionRequest>,
) -> Result<(StatusCode, Json<InteractionResponse>), ApiError> {
    let interaction = state.interactions.create(payload).await?;
    Ok((StatusCode::CREATED, Json(interaction.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/interactions",
    responses((status = 200, description = "All interactions", body = [InteractionResponse])),
    security(("bearer_auth" = [])),
    tag = "interactions"
)]
#[instrument(skip(state))]
pub async fn list_interactions(
    State(state): State<ApiState>,
) -> Result<Json<Vec<InteractionResponse>>, ApiError> {
    let interactions = state.interactions.list().await?;
    Ok(Json(interactions.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/leads/{id}/interactions",
    params(("id" = String, Path, description = "Lead id")),
    responses((status = 200, description = "Interactions for the lead", body = [InteractionResponse])),
    security(("bearer_auth" = [])),
    tag = "interactions"
)]
#[instrument(skip(state))]
pub async fn list_for_lead(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<InteractionResponse>>, ApiError> {
    let lead_id = LeadId::from_string(id);
    let interactions = state.interactions.list_for_lead(&lead_id).await?;
    Ok(Json(interactions.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/interactions/{id}",
    params(("id" = String, Path, description = "Interaction id")),
    responses(
        (status = 200, description = "Interaction found", body = InteractionResponse),
        (status = 404, description = "No such interaction")
    ),
    security(("bearer_auth" = [])),
    tag = "interactions"
)]
#[instrument(skip(state))]
pub async fn get_interaction(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<InteractionResponse>, ApiError> {
    let interaction = state.interactions.get(&id).await?;
    Ok(Json(interaction.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/interactions/{id}",
    params(("id" = String, Path, description = "Interaction id")),
    request_body = UpdateInteractionRequest,
    responses(
        (status = 200, description = "Interaction updated", body = InteractionResponse),
        (status = 404, description = "No such interaction")
    ),
    security(("bearer_auth" = [])),
    tag = "interactions"
)]
#[instrument(skip(state, payload))]
pub async fn update_interaction(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateInteractionRequest>,
) -> Result<Json<InteractionResponse>, ApiError> {
    let interaction = state.interactions.update(&id, payload).await?;
    Ok(Json(interaction.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/interactions/{id}",
    params(("id" = String, Path, description = "Interaction id")),
    responses(
        (status = 200, description = "Removed interaction", body = InteractionResponse),
        (status = 404, description = "No such interaction")
    ),
    security(("bearer_auth" = [])),
    tag = "interactions"
)]
#[instrument(skip(state))]
pub async fn delete_interaction(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<InteractionResponse>, ApiError> {
    let interaction = state.interactions.delete(&id).await?;
    Ok(Json(interaction.into()))
}
