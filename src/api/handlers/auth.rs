//! Registration, session, and token endpoints: sign-up, login, token
//! issuance, password reset, account activation. All public.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::auth::{
    AccountResponse, CreateAccountRequest, LoginRequest, LoginResponse, TokenPurpose,
};

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account registered", body = AccountResponse),
        (status = 400, description = "Validation error")
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn register(
    State(state): State<ApiState>,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let account = state.accounts.create(payload).await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials or disabled account")
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<ApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let response = state.auth.login(&payload).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub email: String,
    pub purpose: TokenPurpose,
    /// Minutes until expiry; omitted or non-positive uses the server default.
    pub ttl_minutes: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    pub purpose: TokenPurpose,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/tokens",
    request_body = TokenRequest,
    responses(
        (status = 201, description = "Token issued", body = TokenResponse),
        (status = 401, description = "No account for that email")
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload), fields(purpose = %payload.purpose))]
pub async fn request_token(
    State(state): State<ApiState>,
    Json(payload): Json<TokenRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let token = state
        .accounts
        .create_token(&payload.email, payload.purpose, payload.ttl_minutes)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token: token.token,
            purpose: token.purpose,
            expires_at: token.expires_at,
        }),
    ))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmPasswordResetRequest {
    pub token: String,
    pub password: String,
    pub password_confirmation: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset",
    request_body = ConfirmPasswordResetRequest,
    responses(
        (status = 200, description = "Password updated", body = AccountResponse),
        (status = 400, description = "Password confirmation mismatch or too short"),
        (status = 401, description = "Unknown or expired token")
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn confirm_password_reset(
    State(state): State<ApiState>,
    Json(payload): Json<ConfirmPasswordResetRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state
        .accounts
        .confirm_reset_password(&payload.token, &payload.password, &payload.password_confirmation)
        .await?;

    Ok(Json(account.into()))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmActivationRequest {
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/activate",
    request_body = ConfirmActivationRequest,
    responses(
        (status = 200, description = "Account activated", body = AccountResponse),
        (status = 401, description = "Unknown or expired token")
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn confirm_activation(
    State(state): State<ApiState>,
    Json(payload): Json<ConfirmActivationRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.accounts.confirm_activation(&payload.token).await?;
    Ok(Json(account.into()))
}
