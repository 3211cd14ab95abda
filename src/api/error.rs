//! Wire-level error representation.
//!
//! Services speak [`Error`](crate::errors::Error); the conversion here is
//! the only place transport status codes are decided, driven by
//! `Error::status_code()`. Internal detail (database context, source
//! chains) never reaches the response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::errors::Error;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: status
                    .canonical_reason()
                    .unwrap_or("error")
                    .to_ascii_lowercase()
                    .replace(' ', "_"),
                message: message.into(),
                field: None,
            },
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Authentication required")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Server-side failures are logged with full detail and reported
        // with a generic body.
        let message = if status.is_server_error() {
            error!(error = %err, "request failed");
            "Internal server error".to_string()
        } else {
            err.to_string()
        };

        let field = match &err {
            Error::Validation { field, .. } => field.clone(),
            Error::FieldBelowMinSize { field, .. } => Some(field.clone()),
            _ => None,
        };

        let mut api = Self::new(status, message);
        api.body.field = field;
        api
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
