//! Rating ledger repository.
//!
//! The `rating` table holds at most one row per (`user_id`, `store_id`); the
//! `rating_user_store_key` unique constraint backs the upsert so concurrent
//! first submissions cannot create duplicates. Aggregates are always computed
//! from the table, never cached.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use store_ratings_core::{
    Email, RatingId, RatingValue, StoreAggregate, StoreId, UserId,
};

use super::RepositoryError;
use crate::models::rating::{
    Rating, RatingWrite, StoreAverageEntry, StoreRatingEntry, UserRatingEntry,
};

// =============================================================================
// Internal Row Types
// =============================================================================

fn rating_value(raw: i32) -> Result<RatingValue, RepositoryError> {
    RatingValue::try_from(raw).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid rating in database: {e}"))
    })
}

/// Internal row type for the upsert statement.
#[derive(Debug, sqlx::FromRow)]
struct UpsertRow {
    id: i32,
    user_id: i32,
    store_id: i32,
    value: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    inserted: bool,
}

/// Internal row type for a user's ratings joined with the rated store.
#[derive(Debug, sqlx::FromRow)]
struct UserRatingRow {
    store_id: i32,
    value: i32,
    store_name: String,
    store_address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRatingRow {
    fn into_entry(self) -> Result<(StoreId, UserRatingEntry), RepositoryError> {
        Ok((
            StoreId::new(self.store_id),
            UserRatingEntry {
                rating: rating_value(self.value)?,
                store_name: self.store_name,
                store_address: self.store_address,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        ))
    }
}

/// Internal row type for a store's ratings joined with the rater.
#[derive(Debug, sqlx::FromRow)]
struct StoreRatingRow {
    id: i32,
    value: i32,
    user_id: i32,
    user_name: String,
    user_email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StoreRatingRow> for StoreRatingEntry {
    type Error = RepositoryError;

    fn try_from(row: StoreRatingRow) -> Result<Self, Self::Error> {
        let user_email = Email::parse(&row.user_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: RatingId::new(row.id),
            rating: rating_value(row.value)?,
            user_id: UserId::new(row.user_id),
            user_name: row.user_name,
            user_email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for per-store sums.
#[derive(Debug, sqlx::FromRow)]
struct StoreSumRow {
    store_id: i32,
    store_name: String,
    rating_sum: i64,
    rating_count: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the rating ledger.
pub struct RatingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RatingRepository<'a> {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or update the caller's rating for a store, then read the
    /// store's aggregate in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back when dropped.
    pub async fn upsert(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
    ) -> Result<RatingWrite, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UpsertRow>(
            r"
            INSERT INTO rating (user_id, store_id, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, store_id)
            DO UPDATE SET value = EXCLUDED.value, updated_at = now()
            RETURNING id, user_id, store_id, value, created_at, updated_at,
                      (xmax = 0) AS inserted
            ",
        )
        .bind(user_id)
        .bind(store_id)
        .bind(value.as_i32())
        .fetch_one(&mut *tx)
        .await?;

        let aggregate = aggregate_for(&mut *tx, store_id).await?;

        tx.commit().await?;

        Ok(RatingWrite {
            rating: Rating {
                id: RatingId::new(row.id),
                user_id: UserId::new(row.user_id),
                store_id: StoreId::new(row.store_id),
                rating: rating_value(row.value)?,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            created: row.inserted,
            aggregate,
        })
    }

    /// Compute a store's aggregate from the ledger.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn aggregate(&self, store_id: StoreId) -> Result<StoreAggregate, RepositoryError> {
        aggregate_for(self.pool, store_id).await
    }

    /// All ratings given by one user, with the rated store's identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored value is out of range.
    pub async fn list_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<(StoreId, UserRatingEntry)>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRatingRow>(
            r"
            SELECT r.store_id, r.value, r.created_at, r.updated_at,
                   u.name AS store_name, u.address AS store_address
            FROM rating r
            INNER JOIN app_user u ON r.store_id = u.id
            WHERE r.user_id = $1
            ORDER BY r.store_id ASC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(UserRatingRow::into_entry).collect()
    }

    /// The rating one user gave one store, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored value is out of range.
    pub async fn get_by_user_and_store(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<UserRatingEntry>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRatingRow>(
            r"
            SELECT r.store_id, r.value, r.created_at, r.updated_at,
                   u.name AS store_name, u.address AS store_address
            FROM rating r
            INNER JOIN app_user u ON r.store_id = u.id
            WHERE r.user_id = $1 AND r.store_id = $2
            ",
        )
        .bind(user_id)
        .bind(store_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| r.into_entry().map(|(_, entry)| entry))
            .transpose()
    }

    /// All ratings a store received, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_for_store(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<StoreRatingEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreRatingRow>(
            r"
            SELECT r.id, r.value, r.created_at, r.updated_at,
                   u.id AS user_id, u.name AS user_name, u.email AS user_email
            FROM rating r
            INNER JOIN app_user u ON r.user_id = u.id
            WHERE r.store_id = $1
            ORDER BY r.updated_at DESC, r.id DESC
            ",
        )
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Aggregates for every store, including stores with no ratings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn store_averages(
        &self,
    ) -> Result<Vec<(StoreId, StoreAverageEntry)>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreSumRow>(
            r"
            SELECT u.id AS store_id, u.name AS store_name,
                   COALESCE(SUM(r.value), 0)::BIGINT AS rating_sum,
                   COUNT(r.id) AS rating_count
            FROM app_user u
            LEFT JOIN rating r ON r.store_id = u.id
            WHERE u.role = 'OWNER'
            GROUP BY u.id, u.name
            ORDER BY u.id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    StoreId::new(row.store_id),
                    StoreAverageEntry {
                        store_name: row.store_name,
                        aggregate: StoreAggregate::from_sum(row.rating_sum, row.rating_count),
                    },
                )
            })
            .collect())
    }

    /// Total number of ratings in the ledger.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_all(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rating")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Delete the caller's rating for a store.
    ///
    /// # Returns
    ///
    /// Returns `true` if the rating was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, user_id: UserId, store_id: StoreId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM rating WHERE user_id = $1 AND store_id = $2")
            .bind(user_id)
            .bind(store_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Sum and count a store's ratings on any executor (pool or transaction).
async fn aggregate_for<'e, E>(executor: E, store_id: StoreId) -> Result<StoreAggregate, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let (sum, count) = sqlx::query_as::<_, (i64, i64)>(
        r"
        SELECT COALESCE(SUM(value), 0)::BIGINT, COUNT(*)
        FROM rating
        WHERE store_id = $1
        ",
    )
    .bind(store_id)
    .fetch_one(executor)
    .await?;

    Ok(StoreAggregate::from_sum(sum, count))
}
