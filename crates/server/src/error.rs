//! Unified error handling with Sentry integration.
//!
//! Every failure a user handler can hit is an `AppError`. Server-side failures
//! are logged and captured to Sentry before responding; the client only ever
//! sees a status code and a short plain-text message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use rolodex_core::ValidationError;

use crate::db::RepositoryError;

/// Which write failed, for the client-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    const fn verb(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Application-level error type for the user handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// No connection could be obtained from the store.
    #[error("Database unavailable: {0}")]
    DatabaseUnavailable(#[source] RepositoryError),

    /// The `{id}` path segment is not an integer.
    #[error("Invalid user ID: {0}")]
    InvalidUserId(String),

    /// The request body is not a decodable user.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The decoded user breaks the entity invariant.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A read failed. Not-found and store errors look the same to the client.
    #[error("User not found: {0}")]
    NotFound(#[source] RepositoryError),

    /// A write failed.
    #[error("Failed to {} user: {source}", .operation.verb())]
    Operation {
        operation: Operation,
        #[source]
        source: RepositoryError,
    },
}

impl AppError {
    /// Wrap a store error from a write.
    #[must_use]
    pub const fn operation(operation: Operation, source: RepositoryError) -> Self {
        Self::Operation { operation, source }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::DatabaseUnavailable(_) | Self::Operation { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::InvalidUserId(_) | Self::InvalidInput(_) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Client-facing message. Store error details never leave the server.
    fn public_message(&self) -> String {
        match self {
            Self::DatabaseUnavailable(_) => "Failed to connect to the database".to_string(),
            Self::InvalidUserId(_) => "Invalid user ID".to_string(),
            Self::InvalidInput(_) => "Invalid input".to_string(),
            Self::Validation(err) => err.to_string(),
            Self::NotFound(_) => "User not found".to_string(),
            Self::Operation { operation, .. } => format!("Failed to {} user", operation.verb()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, self.public_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_and_body(err: AppError) -> (StatusCode, String) {
        (err.status(), err.public_message())
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            status_and_body(AppError::DatabaseUnavailable(RepositoryError::Database(
                sqlx::Error::PoolTimedOut
            ))),
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to connect to the database".to_string()
            )
        );
        assert_eq!(
            status_and_body(AppError::InvalidUserId("abc".to_string())),
            (StatusCode::BAD_REQUEST, "Invalid user ID".to_string())
        );
        assert_eq!(
            status_and_body(AppError::InvalidInput("EOF".to_string())),
            (StatusCode::BAD_REQUEST, "Invalid input".to_string())
        );
        assert_eq!(
            status_and_body(AppError::NotFound(RepositoryError::NotFound)),
            (StatusCode::NOT_FOUND, "User not found".to_string())
        );
    }

    #[test]
    fn test_validation_message_reaches_client() {
        assert_eq!(
            status_and_body(ValidationError::InvalidFormat("email").into()),
            (StatusCode::BAD_REQUEST, "invalid email format".to_string())
        );
    }

    #[test]
    fn test_operation_messages_hide_store_details() {
        for (operation, expected) in [
            (Operation::Create, "Failed to create user"),
            (Operation::Update, "Failed to update user"),
            (Operation::Delete, "Failed to delete user"),
        ] {
            let err = AppError::operation(
                operation,
                RepositoryError::DataCorruption("secret detail".to_string()),
            );
            assert!(err.to_string().contains("secret detail"));
            assert_eq!(
                status_and_body(err),
                (StatusCode::INTERNAL_SERVER_ERROR, expected.to_string())
            );
        }
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::InvalidUserId("x".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
