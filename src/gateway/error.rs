//! Gateway error type and HTTP status mapping.
//!
//! Failures are typed and surfaced as status-coded JSON bodies; error text
//! never rides inside a 200 payload.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::providers::sanitize_api_error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Client sent a missing/empty required field. Never retried.
    #[error("{0}")]
    InvalidInput(String),

    /// Missing or wrong bearer token.
    #[error("{0}")]
    Unauthorized(String),

    /// Requested document does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Collaborator or internal failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(err) => {
                error!("request failed: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    sanitize_api_error(&err.to_string()),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn invalid_input_maps_to_400() {
        let response = ApiError::InvalidInput("Prompt is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError::NotFound("Report not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_maps_to_500() {
        let response = ApiError::from(anyhow::anyhow!("upstream exploded")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
