//! User roles.

use serde::{Deserialize, Serialize};

/// The role a user account was created with.
///
/// Roles are fixed at creation. A store is simply a user with the
/// [`Role::Owner`] role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Manages users and sees every store's aggregate.
    Admin,
    /// Owns a store that other users rate.
    Owner,
    /// Browses stores and submits ratings.
    User,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Owner, Self::User];

    /// The wire/database spelling of this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Owner => "OWNER",
            Self::User => "USER",
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    #[must_use]
    pub const fn is_owner(self) -> bool {
        matches!(self, Self::Owner)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known role.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0} (expected ADMIN, OWNER or USER)")]
pub struct RoleParseError(pub String);

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    /// Parses a role case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "OWNER" => Ok(Self::Owner),
            "USER" => Ok(Self::User),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}
