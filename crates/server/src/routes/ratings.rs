//! Rating ledger route handlers. Every route requires an access token.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use store_ratings_core::{RatingValue, StoreAggregate, StoreId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::response::ApiResponse;
use crate::services::ratings::{RatingService, validate_submission};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    pub store_id: Option<i64>,
    pub rating: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingData {
    pub rating: RatingValue,
    #[serde(flatten)]
    pub aggregate: StoreAggregate,
}

/// `POST /api/ratings/submit`
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    WithRejection(Json(body), _): WithRejection<Json<SubmitRatingRequest>, AppError>,
) -> Result<impl IntoResponse> {
    let (store_id, value) = validate_submission(body.store_id, body.rating)?;

    let write = RatingService::new(state.pool())
        .submit(principal.id, store_id, value)
        .await?;

    let message = if write.created {
        "Rating submitted successfully."
    } else {
        "Rating updated successfully."
    };

    Ok(ApiResponse::ok(
        message,
        SubmitRatingData {
            rating: write.rating.rating,
            aggregate: write.aggregate,
        },
    ))
}

/// `GET /api/ratings/user/all`
pub async fn user_all(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
) -> Result<impl IntoResponse> {
    let ratings = RatingService::new(state.pool()).for_user(principal.id).await?;
    Ok(ApiResponse::ok("User ratings fetched successfully.", ratings))
}

/// `GET /api/ratings/user/{storeId}`
pub async fn user_for_store(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    WithRejection(Path(store_id), _): WithRejection<Path<StoreId>, AppError>,
) -> Result<impl IntoResponse> {
    let rating = RatingService::new(state.pool())
        .for_user_and_store(principal.id, store_id)
        .await?;
    Ok(ApiResponse::ok("User rating fetched successfully.", rating))
}

/// `GET /api/ratings/averages/all`
pub async fn averages_all(
    State(state): State<AppState>,
    RequireAuth(_principal): RequireAuth,
) -> Result<impl IntoResponse> {
    let averages = RatingService::new(state.pool()).averages().await?;
    Ok(ApiResponse::ok("Store averages fetched successfully.", averages))
}

/// `GET /api/ratings/store/{storeId}`
pub async fn store(
    State(state): State<AppState>,
    RequireAuth(_principal): RequireAuth,
    WithRejection(Path(store_id), _): WithRejection<Path<StoreId>, AppError>,
) -> Result<impl IntoResponse> {
    let ratings = RatingService::new(state.pool()).for_store(store_id).await?;
    Ok(ApiResponse::ok("Ratings fetched successfully.", ratings))
}

/// `DELETE /api/ratings/{storeId}`
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    WithRejection(Path(store_id), _): WithRejection<Path<StoreId>, AppError>,
) -> Result<impl IntoResponse> {
    RatingService::new(state.pool())
        .delete(principal.id, store_id)
        .await?;
    Ok(ApiResponse::message("Rating deleted successfully."))
}
