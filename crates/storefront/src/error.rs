//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding. All route handlers return `Result<T, AppError>`.
//!
//! Mapping policy: authentication failures redirect to the login page,
//! ownership and not-found failures redirect to a safe default view, and
//! storage failures surface a generic server error. No error response ever
//! reflects a partially applied write - the repositories roll back first.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, CartError, OrderError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this is a server-side failure worth reporting.
    fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(
                RepositoryError::Database(_)
                    | RepositoryError::DataCorruption(_)
                    | RepositoryError::Conflict(_)
            ) | Self::Internal(_)
                | Self::Cart(CartError::Repository(_))
                | Self::Order(OrderError::Storage(_))
                | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }

        match self {
            Self::Unauthorized(_) => Redirect::to("/auth/login").into_response(),

            // Ownership and missing-resource failures land on the order
            // history, the safe default view.
            Self::Order(OrderError::Forbidden | OrderError::NotFound) => {
                Redirect::to("/account/orders").into_response()
            }
            Self::Order(OrderError::EmptyCart) => Redirect::to("/cart").into_response(),

            Self::Database(RepositoryError::Forbidden) => {
                Redirect::to("/").into_response()
            }

            Self::NotFound(_) | Self::Database(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, "Not found").into_response()
            }

            Self::Cart(CartError::InvalidProduct) => {
                (StatusCode::BAD_REQUEST, "No such game").into_response()
            }
            Self::Cart(CartError::InvalidQuantity) => {
                (StatusCode::BAD_REQUEST, "Quantity out of range").into_response()
            }

            Self::Auth(err) => {
                let message = match err {
                    AuthError::InvalidCredentials => "credentials",
                    AuthError::UserAlreadyExists => "taken",
                    AuthError::WeakPassword(_) => "password",
                    AuthError::InvalidUsername(_) => "username",
                    // Server-side variants were handled above.
                    _ => "internal",
                };
                Redirect::to(&format!("/auth/login?error={message}")).into_response()
            }

            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),

            // Server errors were handled above; this arm is unreachable in
            // practice but keeps the match exhaustive.
            Self::Database(_) | Self::Internal(_) | Self::Order(OrderError::Storage(_)) | Self::Cart(CartError::Repository(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn location(response: &Response) -> Option<&str> {
        response
            .headers()
            .get(axum::http::header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("game-123".to_string());
        assert_eq!(err.to_string(), "Not found: game-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_unauthorized_redirects_to_login() {
        let response = AppError::Unauthorized("no session".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/auth/login"));
    }

    #[test]
    fn test_order_failures_redirect_to_safe_views() {
        let response = AppError::Order(OrderError::Forbidden).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/account/orders"));

        let response = AppError::Order(OrderError::EmptyCart).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/cart"));
    }

    #[test]
    fn test_storage_failures_are_generic_500s() {
        let response =
            AppError::Order(OrderError::Storage(RepositoryError::NotFound)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = AppError::Internal("details stay hidden".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_ownership_failures_are_not_reported_as_server_errors() {
        let response = AppError::Database(RepositoryError::Forbidden).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/"));

        let response = AppError::Database(RepositoryError::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_client_errors_keep_their_status() {
        let response = AppError::NotFound("x".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::Cart(CartError::InvalidProduct).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
