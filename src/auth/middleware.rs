//! Bearer-token authentication middleware.
//!
//! Validates the `Authorization: Bearer <jwt>` header and attaches the
//! resulting [`Principal`] as a request extension for handlers to extract.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::api::error::ApiError;
use crate::auth::authentication_service::AuthenticationService;

pub async fn require_auth(
    State(auth): State<Arc<AuthenticationService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(ApiError::unauthorized)?;

    let token = header.strip_prefix("Bearer ").ok_or_else(ApiError::unauthorized)?;

    let principal = auth.jwt().verify(token).map_err(|err| {
        warn!(error = %err, "rejected bearer token");
        ApiError::unauthorized()
    })?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
