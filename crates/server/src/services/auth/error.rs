//! Authentication error types.

use thiserror::Error;

use super::tokens::TokenError;
use crate::db::RepositoryError;

/// Errors that can occur during authentication and credential operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more submitted fields broke a rule.
    #[error("validation failed: {}", .0.join(" "))]
    Validation(Vec<String>),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// No token in the cookie or `Authorization` header.
    #[error("access token missing")]
    Unauthenticated,

    /// Token signature or expiry check failed.
    #[error("token rejected: {0}")]
    Token(#[from] TokenError),

    /// The token's subject no longer exists.
    #[error("principal not found")]
    PrincipalNotFound,

    /// The principal's role does not allow the operation.
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
