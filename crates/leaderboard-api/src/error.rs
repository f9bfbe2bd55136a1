//! # API Error Types
//!
//! Unified error handling for the HTTP layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use leaderboard_persistence::PersistenceError;

/// API-level errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Identity provider error: {0}")]
    Identity(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Persistence(e) if !e.is_unavailable() => StatusCode::BAD_REQUEST,
            Self::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Identity(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Persistence(e) if !e.is_unavailable() => "INVALID_INPUT",
            Self::Persistence(_) => "STORE_UNAVAILABLE",
            Self::Identity(_) => "IDENTITY_PROVIDER_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message shown to the client. Store and provider details stay in the log.
    fn public_message(&self) -> String {
        match self {
            Self::Persistence(e) if e.is_unavailable() => {
                "Leaderboard storage is unavailable, please retry".to_string()
            }
            Self::Identity(_) => "Login provider request failed".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<leaderboard_domain::DomainError> for ApiError {
    fn from(err: leaderboard_domain::DomainError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() || status == StatusCode::BAD_GATEWAY {
            tracing::error!(error = %self, code = self.error_code(), "Request failed");
        }

        let body = serde_json::json!({
            "error": {
                "message": self.public_message(),
                "code": self.error_code(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
