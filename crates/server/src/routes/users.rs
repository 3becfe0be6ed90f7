//! User and store listings.

use axum::{extract::State, response::IntoResponse};

use crate::db::UserRepository;
use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::response::ApiResponse;
use crate::state::AppState;

/// `GET /api/users/getUsers` - every account, admin only.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    let users = UserRepository::new(state.pool()).list_all().await?;
    Ok(ApiResponse::ok("Users fetched successfully.", users))
}

/// `GET /api/users/getStores` - every `OWNER` account.
pub async fn list_stores(
    State(state): State<AppState>,
    RequireAuth(_principal): RequireAuth,
) -> Result<impl IntoResponse> {
    let stores = UserRepository::new(state.pool()).list_stores().await?;
    Ok(ApiResponse::ok("Stores fetched successfully.", stores))
}
