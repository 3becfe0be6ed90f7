//! Rating ledger operations.
//!
//! Stores are `OWNER` accounts, so every store lookup goes through the user
//! repository with a role filter before the ledger is touched.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use store_ratings_core::{RatingValue, StoreAggregate, StoreId, UserId};

use crate::db::{RatingRepository, RepositoryError, UserRepository};
use crate::models::rating::{RatingWrite, StoreAverageEntry, StoreRatingEntry, UserRatingEntry};

/// Errors from rating operations.
#[derive(Debug, Error)]
pub enum RatingError {
    /// Store id or rating missing, or rating out of range.
    #[error("{0}")]
    Validation(&'static str),

    /// The store id does not name an `OWNER` account.
    #[error("store not found")]
    StoreNotFound,

    /// The caller tried to rate their own store.
    #[error("cannot rate own store")]
    SelfRating,

    /// The caller has no rating for that store.
    #[error("rating not found")]
    RatingNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

pub const MISSING_FIELDS: &str = "Store ID and rating are required.";
pub const OUT_OF_RANGE: &str = "Rating must be between 1 and 5.";

/// A store's full rating list with its aggregate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRatings {
    pub ratings: Vec<StoreRatingEntry>,
    #[serde(flatten)]
    pub aggregate: StoreAggregate,
    pub store_name: String,
    pub store_address: String,
}

/// The caller's ratings keyed by store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRatings {
    pub ratings: BTreeMap<StoreId, UserRatingEntry>,
    pub total_ratings: usize,
}

/// Every store's aggregate keyed by store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreAverages {
    pub averages: BTreeMap<StoreId, StoreAverageEntry>,
    pub total_stores: usize,
}

/// Validate raw submission fields.
///
/// # Errors
///
/// Returns `RatingError::Validation` if a field is missing or the rating is outside 1-5.
pub fn validate_submission(
    store_id: Option<i64>,
    rating: Option<i64>,
) -> Result<(StoreId, RatingValue), RatingError> {
    let (Some(store_id), Some(rating)) = (store_id.filter(|id| *id != 0), rating) else {
        return Err(RatingError::Validation(MISSING_FIELDS));
    };

    let value = RatingValue::new(rating).map_err(|_| RatingError::Validation(OUT_OF_RANGE))?;
    // An id outside the key space cannot name a store.
    let store_id = i32::try_from(store_id).map_err(|_| RatingError::StoreNotFound)?;

    Ok((StoreId::new(store_id), value))
}

/// Rating ledger service.
pub struct RatingService<'a> {
    ratings: RatingRepository<'a>,
    users: UserRepository<'a>,
}

impl<'a> RatingService<'a> {
    /// Create a new rating service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            ratings: RatingRepository::new(pool),
            users: UserRepository::new(pool),
        }
    }

    /// Insert or replace the caller's rating for a store and return the
    /// store's recomputed aggregate.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::StoreNotFound` if `store_id` is not an `OWNER`.
    /// Returns `RatingError::SelfRating` if the caller owns the store.
    pub async fn submit(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
    ) -> Result<RatingWrite, RatingError> {
        if self.users.get_store(store_id).await?.is_none() {
            return Err(RatingError::StoreNotFound);
        }

        if store_id.owner() == user_id {
            return Err(RatingError::SelfRating);
        }

        let write = self.ratings.upsert(user_id, store_id, value).await?;

        tracing::info!(
            user_id = %user_id,
            store_id = %store_id,
            rating = value.get(),
            created = write.created,
            average = %write.aggregate.average_rating,
            "Rating stored"
        );
        Ok(write)
    }

    /// All ratings the caller has given.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::Repository` if the query fails.
    pub async fn for_user(&self, user_id: UserId) -> Result<UserRatings, RatingError> {
        let ratings: BTreeMap<_, _> = self.ratings.list_by_user(user_id).await?.into_iter().collect();
        Ok(UserRatings {
            total_ratings: ratings.len(),
            ratings,
        })
    }

    /// The caller's rating for one store.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::RatingNotFound` if the caller hasn't rated the store.
    pub async fn for_user_and_store(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<UserRatingEntry, RatingError> {
        self.ratings
            .get_by_user_and_store(user_id, store_id)
            .await?
            .ok_or(RatingError::RatingNotFound)
    }

    /// Aggregates for every store, zero for stores nobody rated.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::Repository` if the query fails.
    pub async fn averages(&self) -> Result<StoreAverages, RatingError> {
        let averages: BTreeMap<_, _> = self.ratings.store_averages().await?.into_iter().collect();
        Ok(StoreAverages {
            total_stores: averages.len(),
            averages,
        })
    }

    /// Every rating a store received, newest first, with its aggregate.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::StoreNotFound` if `store_id` is not an `OWNER`.
    pub async fn for_store(&self, store_id: StoreId) -> Result<StoreRatings, RatingError> {
        let store = self
            .users
            .get_store(store_id)
            .await?
            .ok_or(RatingError::StoreNotFound)?;

        let ratings = self.ratings.list_for_store(store_id).await?;
        let aggregate = self.ratings.aggregate(store_id).await?;

        Ok(StoreRatings {
            ratings,
            aggregate,
            store_name: store.name,
            store_address: store.address,
        })
    }

    /// Remove the caller's rating for a store. Aggregates are not touched;
    /// they are recomputed on the next read.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::RatingNotFound` if there was nothing to delete.
    pub async fn delete(&self, user_id: UserId, store_id: StoreId) -> Result<(), RatingError> {
        if !self.ratings.delete(user_id, store_id).await? {
            return Err(RatingError::RatingNotFound);
        }

        tracing::info!(user_id = %user_id, store_id = %store_id, "Rating deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_requires_both_fields() {
        assert!(matches!(
            validate_submission(None, Some(4)),
            Err(RatingError::Validation(MISSING_FIELDS))
        ));
        assert!(matches!(
            validate_submission(Some(3), None),
            Err(RatingError::Validation(MISSING_FIELDS))
        ));
        assert!(matches!(
            validate_submission(Some(0), Some(4)),
            Err(RatingError::Validation(MISSING_FIELDS))
        ));
    }

    #[test]
    fn test_submission_rating_range() {
        for bad in [0, 6, -3, 100] {
            assert!(matches!(
                validate_submission(Some(3), Some(bad)),
                Err(RatingError::Validation(OUT_OF_RANGE))
            ));
        }
        let (store, value) = validate_submission(Some(3), Some(5)).unwrap();
        assert_eq!(store, StoreId::new(3));
        assert_eq!(value.get(), 5);
    }

    #[test]
    fn test_submission_rejects_bad_rating_before_store_lookup() {
        assert!(matches!(
            validate_submission(Some(i64::MAX), Some(6)),
            Err(RatingError::Validation(OUT_OF_RANGE))
        ));
        assert!(matches!(
            validate_submission(Some(i64::MAX), Some(4)),
            Err(RatingError::StoreNotFound)
        ));
    }

    #[test]
    fn test_user_ratings_serialize_keyed_by_store() {
        let ratings = UserRatings {
            ratings: BTreeMap::new(),
            total_ratings: 0,
        };
        let json = serde_json::to_value(&ratings).unwrap();
        assert_eq!(json["totalRatings"], 0);
        assert!(json["ratings"].as_object().unwrap().is_empty());
    }
}
