//! Lead endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::instrument;
use utoipa::IntoParams;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::crm::{CreateLeadRequest, LeadResponse, LeadStatus, UpdateLeadRequest};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LeadListQuery {
    pub status: Option<LeadStatus>,
}

#[utoipa::path(
    post,
    path = "/api/v1/leads",
    request_body = CreateLeadRequest,
    responses(
        (status = 201, description = "Lead created", body = LeadResponse),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = [])),
    tag = "leads"
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn create_lead(
    State(state): State<ApiState>,
    Json(payload): Json<CreateLeadRequest>,
) -> Result<(StatusCode, Json<LeadResponse>), ApiError> {
    let lead = state.leads.create(payload).await?;
    Ok((StatusCode::CREATED, Json(lead.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/leads",
    params(LeadListQuery),
    responses((status = 200, description = "Leads, optionally filtered by status", body = [LeadResponse])),
    security(("bearer_auth" = [])),
    tag = "leads"
)]
#[instrument(skip(state))]
pub async fn list_leads(
    State(state): State<ApiState>,
    Query(query): Query<LeadListQuery>,
) -> Result<Json<Vec<LeadResponse>>, ApiError> {
    let leads = match query.status {
        Some(status) => state.leads.list_by_status(status).await?,
        None => state.leads.list().await?,
    };
    Ok(Json(leads.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/leads/{id}",
    params(("id" = String, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Lead found", body = LeadResponse),
        (status = 404, description = "No such lead")
    ),
    security(("bearer_auth" = [])),
    tag = "leads"
)]
#[instrument(skip(state))]
pub async fn get_lead(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<LeadResponse>, ApiError> {
    let lead = state.leads.get(&id).await?;
    Ok(Json(lead.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/leads/{id}",
    params(("id" = String, Path, description = "Lead id")),
    request_body = UpdateLeadRequest,
    responses(
        (status = 200, description = "Lead updated", body = LeadResponse),
        (status = 404, description = "No such lead")
    ),
    security(("bearer_auth" = [])),
    tag = "leads"
)]
#[instrument(skip(state, payload))]
pub async fn update_lead(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateLeadRequest>,
) -> Result<Json<LeadResponse>, ApiError> {
    let lead = state.leads.update(&id, payload).await?;
    Ok(Json(lead.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/leads/{id}",
    params(("id" = String, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Removed lead", body = LeadResponse),
        (status = 404, description = "No such lead")
    ),
    security(("bearer_auth" = [])),
    tag = "leads"
)]
#[instrument(skip(state))]
pub async fn delete_lead(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<LeadResponse>, ApiError> {
    let lead = state.leads.delete(&id).await?;
    Ok(Json(lead.into()))
}
