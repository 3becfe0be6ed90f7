//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use std::borrow::Cow;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::response::ApiErrorBody;
use crate::services::auth::{AuthError, TokenError};
use crate::services::ratings::RatingError;

const INTERNAL_SERVER_ERROR: &str = "Internal server error.";

/// Application-level error type for the ratings API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication or access-gate failure.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Rating ledger failure.
    #[error("Rating error: {0}")]
    Rating(#[from] RatingError),

    /// Request body or path could not be parsed.
    #[error("Validation failed: {}", .0.join(" "))]
    Validation(Vec<String>),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::Auth(AuthError::Validation(_))
            | Self::Rating(RatingError::Validation(_) | RatingError::SelfRating) => {
                StatusCode::BAD_REQUEST
            }
            Self::Auth(
                AuthError::InvalidCredentials
                | AuthError::Unauthenticated
                | AuthError::Token(TokenError::Expired | TokenError::Invalid)
                | AuthError::PrincipalNotFound,
            ) => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::Forbidden(_)) => StatusCode::FORBIDDEN,
            Self::Auth(AuthError::UserAlreadyExists) => StatusCode::CONFLICT,
            Self::Rating(RatingError::StoreNotFound | RatingError::RatingNotFound) => {
                StatusCode::NOT_FOUND
            }
            Self::Database(_)
            | Self::Auth(
                AuthError::Repository(_)
                | AuthError::PasswordHash
                | AuthError::Token(TokenError::Signing),
            )
            | Self::Rating(RatingError::Repository(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message and the itemized errors, if any.
    fn public_parts(self) -> (Cow<'static, str>, Vec<String>) {
        const VALIDATION_FAILED: &str = "Validation failed.";

        let message = match self {
            Self::Validation(errors) | Self::Auth(AuthError::Validation(errors)) => {
                return (VALIDATION_FAILED.into(), errors);
            }
            Self::Rating(RatingError::Validation(msg)) => {
                return (msg.into(), vec![msg.to_string()]);
            }
            Self::Auth(AuthError::InvalidCredentials) => "Invalid credentials.",
            Self::Auth(AuthError::UserAlreadyExists) => "User with this email already exists.",
            Self::Auth(AuthError::Unauthenticated) => "Access token missing.",
            Self::Auth(AuthError::Token(TokenError::Expired)) => "Token expired.",
            Self::Auth(AuthError::Token(TokenError::Invalid)) => "Invalid token.",
            Self::Auth(AuthError::PrincipalNotFound) => "User not found.",
            Self::Auth(AuthError::Forbidden(msg)) => msg,
            Self::Rating(RatingError::StoreNotFound) => "Store not found.",
            Self::Rating(RatingError::SelfRating) => "You cannot rate your own store.",
            Self::Rating(RatingError::RatingNotFound) => "Rating not found.",
            // Never expose internal details.
            Self::Database(_)
            | Self::Auth(
                AuthError::Repository(_)
                | AuthError::PasswordHash
                | AuthError::Token(TokenError::Signing),
            )
            | Self::Rating(RatingError::Repository(_)) => INTERNAL_SERVER_ERROR,
        };

        (message.into(), Vec::new())
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
            tracing::debug!(error = %self, "Request rejected");
        }

        let (message, errors) = self.public_parts();

        (status, Json(ApiErrorBody::new(status, message, errors))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(vec![rejection.body_text()])
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(vec![rejection.body_text()])
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        Self::Auth(AuthError::Token(e))
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Called by the access gate once a principal is resolved.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Database(RepositoryError::NotFound);
        assert_eq!(err.to_string(), "Database error: not found");

        let err = AppError::Validation(vec!["a.".to_string(), "b.".to_string()]);
        assert_eq!(err.to_string(), "Validation failed: a. b.");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: impl Into<AppError>) -> StatusCode {
            err.into().into_response().status()
        }

        assert_eq!(
            get_status(AuthError::Validation(vec![])),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AuthError::UserAlreadyExists),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AuthError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AuthError::Unauthenticated),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(get_status(TokenError::Expired), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(TokenError::Invalid), StatusCode::UNAUTHORIZED);
        assert_eq!(
            get_status(AuthError::PrincipalNotFound),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AuthError::Forbidden("Access denied. Admins only.")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(RatingError::Validation("Rating must be between 1 and 5.")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(RatingError::SelfRating), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(RatingError::StoreNotFound), StatusCode::NOT_FOUND);
        assert_eq!(get_status(RatingError::RatingNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(RepositoryError::NotFound),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AuthError::PasswordHash),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_envelope_lists_every_error() {
        let (status, body) = body_json(
            AuthError::Validation(vec![
                "Name must be at least 20 characters long.".to_string(),
                "Address is required.".to_string(),
            ])
            .into(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["message"], "Validation failed.");
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_internal_errors_are_sanitized() {
        let (status, body) = body_json(AppError::Database(RepositoryError::DataCorruption(
            "invalid email in database: secret@".to_string(),
        )))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error.");
        assert!(!body.to_string().contains("secret@"));
    }

    #[tokio::test]
    async fn test_token_failures_by_kind() {
        let (status, body) = body_json(TokenError::Invalid.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid token.");

        let (status, body) = body_json(TokenError::Signing.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error.");

        let (status, body) = body_json(RatingError::Repository(RepositoryError::NotFound).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error.");

        let (status, body) = body_json(RatingError::RatingNotFound.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Rating not found.");
    }

    #[tokio::test]
    async fn test_self_rating_message() {
        let (_, body) = body_json(RatingError::SelfRating.into()).await;
        assert_eq!(body["message"], "You cannot rate your own store.");
    }
}
