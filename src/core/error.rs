//! Error types and handling for the gateway.
//!
//! Two kinds of failure reach clients: [`AppError::Validation`] for bad input
//! (400) and [`AppError::Upstream`] for anything that went wrong talking to
//! the inference provider (500). Both render as the `{success, error}`
//! envelope.

use crate::core::logging::get_request_id;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Message returned when the required `prompt` field is absent.
pub const PROMPT_REQUIRED: &str = "Prompt is required";

/// JSON body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"success": false, "error": "Prompt is required"}))]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Failure raised while calling or streaming from the remote provider.
///
/// The variants exist for logging; callers only ever see the `Display` text.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// No API key configured; reported at call time, never at startup
    #[error("The api_key client option must be set either by passing api_key to the client or by setting the TOGETHER_API_KEY environment variable")]
    MissingCredential,

    /// Transport-level failure from reqwest (connect, TLS, timeout, body read)
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Error code: {status} - {message}")]
    Status { status: u16, message: String },

    /// Provider answered 2xx but the body was not what we expected
    #[error("Invalid response from provider: {0}")]
    Decode(String),

    /// The incremental stream broke after it had started
    #[error("Stream error: {0}")]
    Stream(String),
}

/// Main error type for request handling.
#[derive(Error, Debug)]
pub enum AppError {
    /// Client provided invalid data; never forwarded upstream
    #[error("{0}")]
    Validation(String),

    /// Remote provider failure
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Anything else that should not happen on a documented path
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %get_request_id(),
                status = status.as_u16(),
                error = %message,
                "Request failed"
            );
        } else {
            tracing::debug!(status = status.as_u16(), error = %message, "Request rejected");
        }

        (status, Json(ErrorEnvelope::new(message))).into_response()
    }
}

/// Convenience type alias for Results using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = AppError::Validation(PROMPT_REQUIRED.to_string());
        assert_eq!(err.to_string(), "Prompt is required");

        let err = AppError::Internal("boom".to_string());
        assert_eq!(err.to_string(), "Internal server error: boom");

        let err = AppError::from(UpstreamError::Status {
            status: 401,
            message: "Invalid API key".to_string(),
        });
        assert_eq!(err.to_string(), "Error code: 401 - Invalid API key");
    }

    #[test]
    fn test_missing_credential_mentions_env_var() {
        let err = UpstreamError::MissingCredential;
        assert!(err.to_string().contains("TOGETHER_API_KEY"));
    }

    #[tokio::test]
    async fn test_validation_response() {
        let response = AppError::Validation(PROMPT_REQUIRED.to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Prompt is required");
    }

    #[tokio::test]
    async fn test_upstream_response() {
        let err = AppError::from(UpstreamError::Decode("no choices".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Invalid response from provider: no choices");
    }

    #[test]
    fn test_internal_error_status() {
        let err = AppError::Internal("custom error".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_from_upstream() {
        let app_err: AppError = UpstreamError::Stream("reset".to_string()).into();
        assert!(matches!(app_err, AppError::Upstream(UpstreamError::Stream(_))));
    }
}
