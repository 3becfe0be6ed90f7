//! Per-role dashboard views.

use axum::{extract::State, response::IntoResponse};

use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::response::ApiResponse;
use crate::services::auth::AuthError;
use crate::services::dashboard::DashboardService;
use crate::state::AppState;

/// `GET /api/dashboard/admin`
pub async fn admin(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    let dashboard = DashboardService::new(state.pool()).admin().await?;
    Ok(ApiResponse::ok("Admin dashboard fetched successfully.", dashboard))
}

/// `GET /api/dashboard/user`
pub async fn user(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
) -> Result<impl IntoResponse> {
    let dashboard = DashboardService::new(state.pool()).user(&principal).await?;
    Ok(ApiResponse::ok("User dashboard fetched successfully.", dashboard))
}

/// `GET /api/dashboard/owner` - the caller's own store.
pub async fn owner(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
) -> Result<impl IntoResponse> {
    if !principal.role.is_owner() {
        return Err(AuthError::Forbidden("Access denied. Store owners only.").into());
    }

    let ratings = DashboardService::new(state.pool()).owner(&principal).await?;
    Ok(ApiResponse::ok("Ratings fetched successfully.", ratings))
}
