//! The access gate.
//!
//! Extractors that resolve the acting principal before a handler runs. The
//! token comes from the `accessToken` cookie, falling back to an
//! `Authorization: Bearer` header. Only the subject id is taken from the
//! token; identity and role are re-read from the credential store.

use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    extract::CookieJar,
    headers::{Authorization, authorization::Bearer},
};

use crate::error::{AppError, set_sentry_user};
use crate::models::user::Principal;
use crate::services::auth::{AuthError, AuthService, TokenKind};
use crate::state::AppState;

/// Cookie holding the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
/// Cookie holding the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Extractor that requires a valid access token for an existing user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(principal): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", principal.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Principal);

/// Extractor that additionally requires the `ADMIN` role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Principal);

/// Pull the raw access token from the request, cookie first.
async fn access_token(parts: &mut Parts) -> Option<String> {
    let jar = parts.extract::<CookieJar>().await.ok()?;
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE)
        && !cookie.value().is_empty()
    {
        return Some(cookie.value().to_owned());
    }

    parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .ok()
        .map(|TypedHeader(Authorization(bearer))| bearer.token().to_owned())
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already resolved by an earlier extractor on this request
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(Self(principal.clone()));
        }

        let token = access_token(parts)
            .await
            .ok_or(AuthError::Unauthenticated)?;

        let principal = AuthService::new(state.pool(), state.tokens())
            .resolve(TokenKind::Access, &token)
            .await?;

        tracing::Span::current().record("user_id", principal.id.as_i32());
        set_sentry_user(&principal.id, Some(principal.email.as_str()));

        parts.extensions.insert(principal.clone());
        Ok(Self(principal))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(principal) = RequireAuth::from_request_parts(parts, state).await?;

        if !principal.role.is_admin() {
            tracing::warn!(user_id = %principal.id, role = %principal.role, "Admin route refused");
            return Err(AuthError::Forbidden("Access denied. Admins only.").into());
        }

        Ok(Self(principal))
    }
}
