//! Rating ledger domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use store_ratings_core::{Email, RatingId, RatingValue, StoreAggregate, StoreId, UserId};

/// One row of the ledger: a user's rating of a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: RatingId,
    pub user_id: UserId,
    pub store_id: StoreId,
    pub rating: RatingValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of submitting a rating.
#[derive(Debug, Clone)]
pub struct RatingWrite {
    /// The row as stored after the write.
    pub rating: Rating,
    /// `true` when the row was inserted, `false` when an existing row was updated.
    pub created: bool,
    /// The store's aggregate read in the same transaction as the write.
    pub aggregate: StoreAggregate,
}

/// A rating the caller gave, keyed by store in the user views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRatingEntry {
    pub rating: RatingValue,
    pub store_name: String,
    pub store_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A rating a store received, with the rater's identity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRatingEntry {
    pub id: RatingId,
    pub rating: RatingValue,
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: Email,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A store's aggregate, keyed by store in the averages view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreAverageEntry {
    pub store_name: String,
    #[serde(flatten)]
    pub aggregate: StoreAggregate,
}
