//! API error type and response mapping
//!
//! Taxonomy: validation failures surface verbatim as 400, unknown ids as
//! 404, everything else (database, storage, bugs) as a generic 500 that
//! never leaks internals. The real cause is logged before it is flattened.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400), message surfaced verbatim
    #[error("{0}")]
    Validation(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Internal server error (500), message replaced with a generic one
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sdoc_common::Error> for ApiError {
    fn from(err: sdoc_common::Error) -> Self {
        match err {
            sdoc_common::Error::Validation(msg) => ApiError::Validation(msg),
            sdoc_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Internal(other.into()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(err.into())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(err) => {
                error!("Internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
