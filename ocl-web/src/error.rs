//! Error types for ocl-web

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::client::ClientError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Terminology API client error
    #[error(transparent)]
    Client(#[from] ClientError),

    /// ocl-common error
    #[error("Common error: {0}")]
    Common(#[from] ocl_common::Error),
}

impl ApiError {
    fn parts(self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Client(err) => match err {
                ClientError::InvalidUri(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string()),
                ClientError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
                ClientError::Api(code, ref body) if (400..500).contains(&code) => (
                    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST),
                    "UPSTREAM_REJECTED",
                    body.clone(),
                ),
                ClientError::Rejected(msg) => (StatusCode::BAD_GATEWAY, "IMPORT_REJECTED", msg),
                other => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", other.to_string()),
            },
            ApiError::Common(err) => match err {
                ocl_common::Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
                other => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR", other.to_string()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = self.parts();

        if status.is_server_error() {
            tracing::warn!(code = error_code, error = %message, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
