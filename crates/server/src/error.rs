//! API error types and response formatting

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// API error type that converts to the HTTP responses clients expect
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Wrong username or password at login
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Missing or malformed `Authorization` header
    #[error("cannot access")]
    CannotAccess,

    /// Token failed verification
    #[error("incorrect token: {0}")]
    IncorrectToken(String),

    /// Empty lookup result
    #[error("not found: {0}")]
    NotFound(&'static str),

    /// A write to the post store failed
    #[error("operation failed: {0}")]
    OperationFailed(String),

    /// A follow/unfollow changed nothing or errored
    #[error("failed to update: {0}")]
    UpdateFailed(String),

    /// Upstream weather service failed
    #[error("weather lookup failed: {0}")]
    Weather(String),

    /// Any other store failure
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body
#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ErrorResponse {
    fn message(message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            error: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse {
                    message: None,
                    error: Some("Incorrect username and password".to_string()),
                },
            ),
            Self::CannotAccess => (StatusCode::FORBIDDEN, ErrorResponse::message("Cannot access")),
            Self::IncorrectToken(detail) => {
                tracing::info!(error = %detail, "Rejected bearer token");
                (
                    StatusCode::FORBIDDEN,
                    ErrorResponse {
                        message: Some("incorrect token".to_string()),
                        error: Some(detail.clone()),
                    },
                )
            }
            Self::NotFound(message) => (StatusCode::NOT_FOUND, ErrorResponse::message(message)),
            Self::OperationFailed(err) => {
                tracing::error!(error = %err, "post store write failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::message("Operation failed."),
                )
            }
            Self::UpdateFailed(err) => {
                tracing::error!(error = %err, "follow graph update failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::message("Failed to update"),
                )
            }
            Self::Weather(err) => {
                tracing::error!(error = %err, "weather lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::message("Weather lookup failed"),
                )
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::message("An internal error occurred"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<gemm_domain::CredentialError> for ApiError {
    fn from(err: gemm_domain::CredentialError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<gemm_domain::PostStoreError> for ApiError {
    fn from(err: gemm_domain::PostStoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<gemm_domain::usecases::FollowError> for ApiError {
    fn from(err: gemm_domain::usecases::FollowError) -> Self {
        Self::UpdateFailed(err.to_string())
    }
}

impl From<gemm_domain::usecases::LoginError> for ApiError {
    fn from(err: gemm_domain::usecases::LoginError) -> Self {
        use gemm_domain::usecases::LoginError;
        match err {
            LoginError::InvalidCredentials => Self::InvalidCredentials,
            LoginError::Token(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<gemm_domain::WeatherError> for ApiError {
    fn from(err: gemm_domain::WeatherError) -> Self {
        Self::Weather(err.to_string())
    }
}
