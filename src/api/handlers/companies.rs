//! Company endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::instrument;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::crm::{CompanyResponse, CreateCompanyRequest, UpdateCompanyRequest};

#[utoipa::path(
    post,
    path = "/api/v1/companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created", body = CompanyResponse),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_company(
    State(state): State<ApiState>,
    Json(payload): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<CompanyResponse>), ApiError> {
    let company = state.companies.create(payload).await?;
    Ok((StatusCode::CREATED, Json(company.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies",
    responses((status = 200, description = "All companies", body = [CompanyResponse])),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
#[instrument(skip(state))]
pub async fn list_companies(
    State(state): State<ApiState>,
) -> Result<Json<Vec<CompanyResponse>>, ApiError> {
    let companies = state.companies.list().await?;
    Ok(Json(companies.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}",
    params(("id" = String, Path, description = "Company id")),
    responses(
        (status = 200, description = "Company found", body = CompanyResponse),
        (status = 404, description = "No such company")
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
#[instrument(skip(state))]
pub async fn get_company(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<CompanyResponse>, ApiError> {
    let company = state.companies.get(&id).await?;
    Ok(Json(company.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/companies/{id}",
    params(("id" = String, Path, description = "Company id")),
    request_body = UpdateCompanyRequest,
    responses(
        (status = 200, description = "Company updated", body = CompanyResponse),
        (status = 404, description = "No such company")
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
#[instrument(skip(state, payload))]
pub async fn update_company(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCompanyRequest>,
) -> Result<Json<CompanyResponse>, ApiError> {
    let company = state.companies.update(&id, payload).await?;
    Ok(Json(company.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/companies/{id}",
    params(("id" = String, Path, description = "Company id")),
    responses(
        (status = 200, description = "Removed company", body = CompanyResponse),
        (status = 404, description = "No such company")
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
#[instrument(skip(state))]
pub async fn delete_company(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<CompanyResponse>, ApiError> {
    let company = state.companies.delete(&id).await?;
    Ok(Json(company.into()))
}
