use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Error taxonomy shared by the bankfeed HTTP surface.
///
/// Upstream provider failures are logged with full context at the call site
/// and surfaced to the caller as a generic message; details are never leaked
/// in the response body for `ProviderError`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not connected to a bank")]
    NotConnected,

    #[error("Invalid input: {0}")]
    InvalidInput(anyhow::Error),

    #[error("Provider error: {0}")]
    ProviderError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        let (status, error_message, details) = match self {
            AppError::NotConnected => (
                StatusCode::BAD_REQUEST,
                "Not connected to a bank".to_string(),
                None,
            ),
            AppError::InvalidInput(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            AppError::ProviderError(err) => {
                tracing::error!(error = %err, "Provider request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Provider request failed".to_string(),
                    None,
                )
            }
            AppError::ConfigError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                Some(err.to_string()),
            ),
            AppError::InternalError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(err.to_string()),
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: error_message,
                details,
            }),
        )
            .into_response()
    }
}
