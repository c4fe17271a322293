//! Unified error handling
//!
//! Provides the application error enum and the JSON error body:
//! - [`AppError`] - application error enum
//! - [`ErrorBody`] - `{ code, message }` response payload
//!
//! Every error response carries a numeric code (the HTTP status) and a
//! message. The error-audit middleware persists the same body as an
//! `error_log` document before the response is returned.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// JSON body for error responses
///
/// ```json
/// {
///   "code": 404,
///   "message": "Could not find an order for the provided id."
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

/// Application error enum
///
/// | Category | Status |
/// |----------|--------|
/// | NotFound | 404 |
/// | Conflict | 409 |
/// | Validation | 400 |
/// | Unauthorized | 401 |
/// | Upstream | 502 |
/// | Database / Internal | 500 |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// External collaborator failure (payment gateway, notification service)
    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // 5xx details are logged, not exposed
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                "Something went wrong, please try again later.".to_string()
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                "Something went wrong, please try again later.".to_string()
            }
            AppError::Upstream(msg) => {
                error!(target: "upstream", error = %msg, "Upstream service failure");
                "Something went wrong, could not reach an external service.".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorBody {
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<surrealdb::Error> for AppError {
    fn from(e: surrealdb::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

/// Application-level Result type used by HTTP handlers and services
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(AppError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::upstream("x").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            AppError::database("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
