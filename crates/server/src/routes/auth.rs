//! Authentication route handlers.
//!
//! Sign-up (admin-issued and self-service), sign-in, token refresh, logout,
//! and password changes. Tokens are set as http-only cookies and echoed in
//! the response body for clients that prefer the `Authorization` header.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::IntoResponse,
};
use axum_extra::extract::{
    WithRejection,
    cookie::{Cookie, CookieJar, SameSite},
};
use serde::{Deserialize, Serialize};

use store_ratings_core::Role;

use crate::error::{AppError, Result};
use crate::middleware::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, RequireAdmin, RequireAuth};
use crate::models::user::{Principal, User};
use crate::response::ApiResponse;
use crate::services::auth::{AuthError, AuthService, TokenPair, validation::SignupFields};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Sign-up body. Fields are optional so that missing ones are reported as
/// validation errors alongside the rest.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Only honoured on the admin route.
    pub role: Option<String>,
}

impl SignUpRequest {
    fn fields(&self) -> SignupFields<'_> {
        SignupFields {
            name: self.name.as_deref(),
            address: self.address.as_deref(),
            email: self.email.as_deref(),
            password: self.password.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub email: Option<String>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest {
    refresh_token: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInData {
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshData {
    pub user: Principal,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

// =============================================================================
// Cookies
// =============================================================================

fn token_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    // Cross-site frontends only receive cookies with SameSite=None, which
    // browsers accept on secure cookies alone.
    let same_site = if secure { SameSite::None } else { SameSite::Lax };

    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(same_site)
        .build()
}

fn with_token_cookies(jar: CookieJar, tokens: &TokenPair, secure: bool) -> CookieJar {
    jar.add(token_cookie(ACCESS_TOKEN_COOKIE, tokens.access_token.clone(), secure))
        .add(token_cookie(REFRESH_TOKEN_COOKIE, tokens.refresh_token.clone(), secure))
}

fn parse_role(raw: Option<&str>) -> Result<Role> {
    raw.map_or(Ok(Role::User), |r| {
        r.parse::<Role>().map_err(|_| {
            AppError::Validation(vec!["Role must be one of ADMIN, OWNER or USER.".to_string()])
        })
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/auth/signup` - an admin creates an account of any role.
pub async fn admin_sign_up(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    WithRejection(Json(body), _): WithRejection<Json<SignUpRequest>, AppError>,
) -> Result<impl IntoResponse> {
    let role = parse_role(body.role.as_deref())?;

    let user = AuthService::new(state.pool(), state.tokens())
        .sign_up(body.fields(), role)
        .await?;

    Ok(ApiResponse::created("User signed up successfully.", user))
}

/// `POST /api/auth/user/signup` - self-service sign-up, always `USER`.
pub async fn user_sign_up(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<SignUpRequest>, AppError>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.pool(), state.tokens())
        .sign_up(body.fields(), Role::User)
        .await?;

    Ok(ApiResponse::created("User signed up successfully.", user))
}

/// `POST /api/auth/signin`
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<SignInRequest>, AppError>,
) -> Result<impl IntoResponse> {
    let (user, tokens) = AuthService::new(state.pool(), state.tokens())
        .sign_in(body.email.as_deref(), body.password.as_deref())
        .await?;

    let jar = with_token_cookies(jar, &tokens, state.config().cookie_secure);

    Ok((
        jar,
        ApiResponse::ok("User signed in successfully.", SignInData { user, tokens }),
    ))
}

/// `POST /api/auth/refresh` - exchange the refresh token (cookie or body)
/// for a new pair.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let from_body = if body.is_empty() {
        RefreshRequest::default()
    } else {
        serde_json::from_slice::<RefreshRequest>(&body)
            .map_err(|e| AppError::Validation(vec![e.to_string()]))?
    };

    let token = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|t| !t.is_empty())
        .or(from_body.refresh_token)
        .ok_or(AuthError::Unauthenticated)?;

    let (principal, tokens) = AuthService::new(state.pool(), state.tokens())
        .refresh(&token)
        .await?;

    let jar = with_token_cookies(jar, &tokens, state.config().cookie_secure);

    Ok((
        jar,
        ApiResponse::ok(
            "Tokens refreshed successfully.",
            RefreshData {
                user: principal,
                tokens,
            },
        ),
    ))
}

/// `POST /api/auth/logout` - clear both token cookies.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar
        .remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_TOKEN_COOKIE).path("/"));

    (jar, ApiResponse::message("User logged out successfully."))
}

/// `GET /api/auth/me` - the principal the gate resolved.
pub async fn me(RequireAuth(principal): RequireAuth) -> impl IntoResponse {
    ApiResponse::ok("Current user fetched successfully.", principal)
}

/// `POST /api/auth/update-password`
pub async fn update_password(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    WithRejection(Json(body), _): WithRejection<Json<UpdatePasswordRequest>, AppError>,
) -> Result<impl IntoResponse> {
    AuthService::new(state.pool(), state.tokens())
        .update_password(
            &principal,
            body.email.as_deref(),
            body.old_password.as_deref(),
            body.new_password.as_deref(),
        )
        .await?;

    Ok(ApiResponse::message("Password updated successfully."))
}
