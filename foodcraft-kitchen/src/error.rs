//! Error types for foodcraft-kitchen
//!
//! `ResolveError` is the combination resolver's failure taxonomy. Image
//! generation failures never show up here: they only drop the image.
//! `ApiError` maps everything onto HTTP status codes and a JSON envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::crafting::CraftError;

/// Combination resolution failure
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Provider credentials or client setup missing; raised before any network call
    #[error("Configuration error: {0}")]
    Config(String),

    /// Empty ingredient name or similar caller mistake
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider returned a non-success status, or every credential was rate-limited
    #[error("Provider error after {attempts} attempt(s): {message}")]
    Provider { attempts: usize, message: String },

    /// Provider succeeded but the content is not a usable `{"name", "emoji"}` object
    #[error("Malformed generation output ({reason}): {raw}")]
    MalformedOutput { reason: String, raw: String },

    /// Discovery store failure
    #[error(transparent)]
    Store(#[from] foodcraft_common::Error),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Common(#[from] foodcraft_common::Error),
}

impl From<CraftError> for ApiError {
    fn from(err: CraftError) -> Self {
        match err {
            CraftError::GameNotFound(_) | CraftError::IngredientNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            CraftError::SameIngredient(_) => ApiError::BadRequest(err.to_string()),
            CraftError::Resolve(e) => ApiError::Resolve(e),
            CraftError::Store(e) => ApiError::Common(e),
        }
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Resolve(err) => match err {
                ResolveError::Config(_) => (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED"),
                ResolveError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                ResolveError::Provider { .. } => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
                ResolveError::MalformedOutput { .. } => {
                    (StatusCode::BAD_GATEWAY, "MALFORMED_OUTPUT")
                }
                ResolveError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            },
            ApiError::Common(err) => match err {
                foodcraft_common::Error::InvalidInput(_) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(code = error_code, "{}", self);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
