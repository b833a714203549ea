/// Error types for the LinkUp server
///
/// Errors are converted to HTTP responses at the handler boundary. Validation
/// failures carry their message to the client; database and internal errors
/// are logged and surfaced as a generic server error.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for server operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid caller identity
    #[error("{0}")]
    Unauthenticated(String),

    /// Referenced entity absent
    #[error("{0}")]
    NotFound(String),

    /// Actor lacks ownership of the target
    #[error("{0}")]
    Forbidden(String),

    /// Self-relation, empty content, malformed input
    #[error("{0}")]
    InvalidOperation(String),

    /// Rolling-window limit exceeded
    #[error("{0}")]
    RateLimited(String),

    /// Duplicate where uniqueness is a hard requirement
    #[error("{0}")]
    Conflict(String),

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Anything else unexpected
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the client-facing body may carry the error message.
    fn is_client_safe(&self) -> bool {
        !matches!(self, AppError::Database(_) | AppError::Internal(_))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if self.is_client_safe() {
            self.to_string()
        } else {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        };

        HttpResponse::build(status).json(serde_json::json!({
            "success": false,
            "message": message,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            AppError::Unauthenticated("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::InvalidOperation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::RateLimited("x".into()).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_errors_hidden_from_clients() {
        let err = AppError::Internal("connection string was postgres://secret".into());
        assert!(!err.is_client_safe());

        let err = AppError::InvalidOperation("you cannot follow yourself".into());
        assert!(err.is_client_safe());
        assert_eq!(err.to_string(), "you cannot follow yourself");
    }
}
