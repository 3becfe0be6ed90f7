//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Liveness
//! GET    /health/ready                  - Readiness (database reachable)
//!
//! # Auth
//! POST   /api/auth/signin               - Sign in, sets token cookies
//! POST   /api/auth/signup               - Admin creates an account (any role)
//! POST   /api/auth/user/signup          - Self-service sign-up (USER)
//! POST   /api/auth/update-password      - Change own password (auth)
//! POST   /api/auth/refresh              - New token pair from refresh token
//! POST   /api/auth/logout               - Clear token cookies
//! GET    /api/auth/me                   - Current principal (auth)
//!
//! # Users (auth)
//! GET    /api/users/getUsers            - Every account (admin)
//! GET    /api/users/getStores           - Every store
//!
//! # Ratings (auth)
//! POST   /api/ratings/submit            - Insert or replace own rating
//! GET    /api/ratings/user/all          - Own ratings keyed by store
//! GET    /api/ratings/user/{storeId}    - Own rating for one store
//! GET    /api/ratings/averages/all      - Every store's aggregate
//! GET    /api/ratings/store/{storeId}   - One store's ratings and aggregate
//! DELETE /api/ratings/{storeId}         - Delete own rating
//!
//! # Dashboards (auth)
//! GET    /api/dashboard/admin           - Totals, users, aggregates (admin)
//! GET    /api/dashboard/user            - Stores, own ratings, aggregates
//! GET    /api/dashboard/owner           - Own store's ratings (owner)
//! ```

pub mod auth;
pub mod dashboard;
pub mod ratings;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signin", post(auth::sign_in))
        .route("/signup", post(auth::admin_sign_up))
        .route("/user/signup", post(auth::user_sign_up))
        .route("/update-password", post(auth::update_password))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/getUsers", get(users::list_users))
        .route("/getStores", get(users::list_stores))
}

/// Create the rating routes router.
pub fn rating_routes() -> Router<AppState> {
    Router::new()
        .route("/submit", post(ratings::submit))
        .route("/user/all", get(ratings::user_all))
        .route("/user/{storeId}", get(ratings::user_for_store))
        .route("/averages/all", get(ratings::averages_all))
        .route("/store/{storeId}", get(ratings::store))
        .route("/{storeId}", delete(ratings::delete))
}

/// Create the dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard::admin))
        .route("/user", get(dashboard::user))
        .route("/owner", get(dashboard::owner))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/auth", auth_routes())
        .nest("/api/users", user_routes())
        .nest("/api/ratings", rating_routes())
        .nest("/api/dashboard", dashboard_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
