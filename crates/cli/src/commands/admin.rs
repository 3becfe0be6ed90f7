//! Administrator bootstrap.
//!
//! Admin-issued sign-up needs an existing administrator, so the first one is
//! created here with the same validation and hashing the API applies.

use store_ratings_core::{Role, UserId};
use store_ratings_server::db::{RepositoryError, UserRepository};
use store_ratings_server::models::NewUser;
use store_ratings_server::services::auth::{
    AuthError, hash_password,
    validation::{SignupFields, validate_signup},
};
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// One or more sign-up rules failed.
    #[error("Invalid administrator: {}", .0.join(" "))]
    Validation(Vec<String>),

    /// Email already registered.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] AuthError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Create a new `ADMIN` account and return its id.
pub async fn create_admin(
    name: &str,
    address: &str,
    email: &str,
    password: &str,
) -> Result<UserId, AdminError> {
    let valid = validate_signup(SignupFields {
        name: Some(name),
        address: Some(address),
        email: Some(email),
        password: Some(password),
    })
    .map_err(AdminError::Validation)?;

    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    if users.email_exists(&valid.email).await? {
        return Err(AdminError::UserExists(valid.email.to_string()));
    }

    tracing::info!(email = %valid.email, "Creating administrator");

    let password_hash = hash_password(&valid.password)?;
    let user = users
        .create(&NewUser {
            name: valid.name,
            address: valid.address,
            email: valid.email,
            password_hash,
            role: Role::Admin,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminError::UserExists(email.to_owned()),
            other => other.into(),
        })?;

    tracing::info!(user_id = %user.id, email = %user.email, "Administrator created");
    Ok(user.id)
}
