//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use store_ratings_core::{Email, Role, StoreId, UserId};

/// A registered account (domain type).
///
/// Never carries the password hash, so it is safe to serialize.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name (20-60 characters).
    pub name: String,
    /// Postal address (at most 400 characters).
    pub address: String,
    /// Lowercased email address.
    pub email: Email,
    /// Role fixed at creation.
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A validated account ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub address: String,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
}

/// The authenticated identity resolved for a request.
///
/// Token claims carry the same four fields, but the gate always rebuilds the
/// principal from the credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// A store: the public face of an `OWNER` account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub email: Email,
    pub address: String,
}
