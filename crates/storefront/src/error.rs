//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Nothing here is fatal: every error becomes a non-2xx response and the
//! session's state stays at its last valid value.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::checkout::FlowError;
use crate::services::{FetchError, SubmitError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog read or sync failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] FetchError),

    /// Order submission failed.
    #[error("Order error: {0}")]
    Order(#[from] SubmitError),

    /// Checkout flow rejected a transition.
    #[error("Checkout error: {0}")]
    Flow(#[from] FlowError),

    /// Session load/store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side and upstream errors to Sentry
        if matches!(
            self,
            Self::Catalog(_) | Self::Order(_) | Self::Session(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Catalog(_) | Self::Order(_) => StatusCode::BAD_GATEWAY,
            Self::Flow(FlowError::Invalid(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Flow(_) => StatusCode::CONFLICT,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Catalog(_) => "Catalog service unavailable".to_string(),
            Self::Order(_) => "Order could not be placed, please try again".to_string(),
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::checkout::ValidationError;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Flow(FlowError::EmptyCart)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Flow(FlowError::Invalid(
                ValidationError::MissingField("name")
            ))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_error_is_visible_to_client() {
        let err = AppError::Flow(FlowError::Invalid(ValidationError::MissingField("phone")));
        assert_eq!(
            err.to_string(),
            "Checkout error: required field is empty: phone"
        );
    }
}
