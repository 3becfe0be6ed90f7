//! Authentication service.
//!
//! Password sign-up and sign-in, password changes, and the token checks the
//! access gate and the refresh endpoint rely on.

mod error;
pub mod tokens;
pub mod validation;

pub use error::AuthError;
pub use tokens::{Claims, TokenError, TokenIssuer, TokenKind, TokenPair};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use store_ratings_core::{Email, Role, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{NewUser, Principal, User};
use validation::{INVALID_EMAIL, SignupFields, password_violations, validate_email, validate_signup};

/// Authentication service.
///
/// Handles account creation, password login, and token-based principal
/// resolution.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenIssuer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenIssuer) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Register a new account with the given role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with every violated rule.
    /// Returns `AuthError::UserAlreadyExists` if the lowercased email is taken.
    pub async fn sign_up(&self, fields: SignupFields<'_>, role: Role) -> Result<User, AuthError> {
        let valid = validate_signup(fields).map_err(AuthError::Validation)?;

        if self.users.email_exists(&valid.email).await? {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(&valid.password)?;

        let new_user = NewUser {
            name: valid.name,
            address: valid.address,
            email: valid.email,
            password_hash,
            role,
        };

        // The unique index still decides when two sign-ups race.
        let user = self.users.create(&new_user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })?;

        tracing::info!(user_id = %user.id, role = %user.role, "Account created");
        Ok(user)
    }

    /// Login with email and password and issue a token pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the email is malformed or the password is missing.
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the password is wrong.
    pub async fn sign_in(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<(User, TokenPair), AuthError> {
        let mut errors = Vec::new();
        let email = validate_email(email);
        if email.is_none() {
            errors.push(INVALID_EMAIL.to_string());
        }
        let password = password.unwrap_or_default();
        if password.is_empty() {
            errors.push("Password is required.".to_string());
        }
        let Some(email) = email.filter(|_| errors.is_empty()) else {
            return Err(AuthError::Validation(errors));
        };

        let Some((user, password_hash)) = self.users.get_with_password_hash(&email).await? else {
            tracing::warn!("Sign-in for unknown email");
            let _ = verify_password(password, DUMMY_PASSWORD_HASH);
            return Err(AuthError::InvalidCredentials);
        };

        if let Err(e) = verify_password(password, &password_hash) {
            tracing::warn!(user_id = %user.id, "Sign-in with wrong password");
            return Err(e);
        }

        let tokens = self.tokens.issue_pair(&Principal::from(&user))?;

        tracing::info!(user_id = %user.id, "User signed in");
        Ok((user, tokens))
    }

    /// Change the caller's password after checking the old one.
    ///
    /// `email`, when supplied, must name the caller.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if a field is missing or the new password breaks a rule.
    /// Returns `AuthError::InvalidCredentials` if the email or old password doesn't match.
    pub async fn update_password(
        &self,
        principal: &Principal,
        email: Option<&str>,
        old_password: Option<&str>,
        new_password: Option<&str>,
    ) -> Result<(), AuthError> {
        let (Some(old_password), Some(new_password)) = (
            old_password.filter(|p| !p.is_empty()),
            new_password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AuthError::Validation(vec![
                "Old password and new password are required.".to_string(),
            ]));
        };

        if let Some(email) = email {
            let matches = Email::parse(email).is_ok_and(|e| e == principal.email);
            if !matches {
                return Err(AuthError::InvalidCredentials);
            }
        }

        let current_hash = self
            .users
            .get_password_hash(principal.id)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        verify_password(old_password, &current_hash)?;

        let violations = password_violations(new_password);
        if !violations.is_empty() {
            return Err(AuthError::Validation(violations));
        }

        let new_hash = hash_password(new_password)?;
        self.users
            .update_password(principal.id, &new_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::PrincipalNotFound,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %principal.id, "Password updated");
        Ok(())
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Verify a token and rebuild the principal from the credential store.
    ///
    /// The claims only name the subject; name, email and role come from the
    /// current row.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if verification fails.
    /// Returns `AuthError::PrincipalNotFound` if the subject no longer exists.
    pub async fn resolve(&self, kind: TokenKind, token: &str) -> Result<Principal, AuthError> {
        let claims = self.tokens.verify(kind, token)?;
        self.principal(claims.id).await
    }

    /// Exchange a refresh token for a fresh pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if the refresh token fails verification.
    /// Returns `AuthError::PrincipalNotFound` if the subject no longer exists.
    pub async fn refresh(&self, refresh_token: &str) -> Result<(Principal, TokenPair), AuthError> {
        let principal = self.resolve(TokenKind::Refresh, refresh_token).await?;
        let tokens = self.tokens.issue_pair(&principal)?;
        Ok((principal, tokens))
    }

    /// Load the current principal for a user ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PrincipalNotFound` if the user doesn't exist.
    pub async fn principal(&self, user_id: UserId) -> Result<Principal, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .map(Principal::from)
            .ok_or(AuthError::PrincipalNotFound)
    }
}

/// Hash a password using Argon2id with a random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Hash checked on sign-in for unknown emails, so both branches cost one
/// argon2 verification. Uses the `Argon2::default()` parameters.
const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$FjGh8SHKZCqm1RrvNXljLw$nz+43o38jb8GmMQi1+8tEkbidJ2VlmBkuGTWEdwsieA";

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_salted_and_opaque() {
        let a = hash_password("Secret#123").unwrap();
        let b = hash_password("Secret#123").unwrap();

        assert_ne!(a, "Secret#123");
        assert!(!a.contains("Secret#123"));
        assert!(a.starts_with("$argon2id$"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("Secret#123").unwrap();
        assert!(verify_password("Secret#123", &hash).is_ok());
        assert!(matches!(
            verify_password("Secret#124", &hash),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            verify_password("Secret#123", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_dummy_hash_matches_default_cost() {
        let parsed = PasswordHash::new(DUMMY_PASSWORD_HASH).unwrap();
        let default = Argon2::default();
        let params = argon2::Params::try_from(&parsed).unwrap();

        assert_eq!(parsed.algorithm, argon2::Algorithm::Argon2id.ident());
        assert_eq!(params.m_cost(), default.params().m_cost());
        assert_eq!(params.t_cost(), default.params().t_cost());
        assert_eq!(params.p_cost(), default.params().p_cost());

        assert!(matches!(
            verify_password("Secret#123", DUMMY_PASSWORD_HASH),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
