//! Signed access and refresh tokens.
//!
//! Both token kinds carry the same claims and are HS256 JWTs, but each is
//! signed with its own secret so a leaked refresh secret cannot mint access
//! tokens (and the reverse).

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use store_ratings_core::{Role, UserId};

use crate::config::TokenConfig;
use crate::models::user::Principal;

/// Errors from verifying a token.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// The signature is valid but `exp` has passed.
    #[error("token expired")]
    Expired,

    /// Bad signature, malformed token, or wrong claims.
    #[error("invalid token")]
    Invalid,

    /// Signing failed.
    #[error("failed to sign token")]
    Signing,
}

/// Which secret and lifetime a token uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims embedded in both token kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// An access/refresh pair issued together.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Keys {
    fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

/// Issues and verifies tokens. Built once at startup and shared through
/// [`crate::state::AppState`].
pub struct TokenIssuer {
    access: Keys,
    refresh: Keys,
    validation: Validation,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            access: Keys::new(config.access_secret.expose_secret(), config.access_ttl),
            refresh: Keys::new(config.refresh_secret.expose_secret(), config.refresh_ttl),
            validation,
        }
    }

    const fn keys(&self, kind: TokenKind) -> &Keys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Lifetime of a token kind.
    #[must_use]
    pub const fn ttl(&self, kind: TokenKind) -> Duration {
        self.keys(kind).ttl
    }

    /// Sign one token for `principal` as if issued at `now`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_at(
        &self,
        kind: TokenKind,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let keys = self.keys(kind);
        let ttl = i64::try_from(keys.ttl.as_secs()).map_err(|_| TokenError::Signing)?;
        let iat = now.timestamp();

        let claims = Claims {
            id: principal.id,
            name: principal.name.clone(),
            email: principal.email.as_str().to_owned(),
            role: principal.role,
            iat,
            exp: iat.saturating_add(ttl),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|_| TokenError::Signing)
    }

    /// Sign an access and a refresh token for `principal`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_pair(&self, principal: &Principal) -> Result<TokenPair, TokenError> {
        let now = Utc::now();
        Ok(TokenPair {
            access_token: self.issue_at(TokenKind::Access, principal, now)?,
            refresh_token: self.issue_at(TokenKind::Refresh, principal, now)?,
        })
    }

    /// Verify signature and expiry and return the claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` when `exp` has passed, and
    /// `TokenError::Invalid` for any other verification failure.
    pub fn verify(&self, kind: TokenKind, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.keys(kind).decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
