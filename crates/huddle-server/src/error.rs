//! Error types for the HTTP layer.
//!
//! [`ApiError`] is what handlers return. It converts into an Axum
//! response with a small JSON body so clients can tell a failure apart
//! from a malformed reply.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::service::ServiceError;

/// Errors that can occur in the HTTP API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The counter record could not be updated.
    #[error("storage error: {0}")]
    Storage(String),

    /// The service is misconfigured (for example, no teams to assign).
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Storage(e) => Self::Storage(e.to_string()),
            ServiceError::Configuration(e) => Self::Configuration(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("could not record the assignment, please try again"),
            ),
            Self::Configuration(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
