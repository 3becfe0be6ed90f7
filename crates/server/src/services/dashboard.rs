//! Read-only compositions of the credential store and the ledger.

use serde::Serialize;
use sqlx::PgPool;

use crate::db::{RatingRepository, UserRepository};
use crate::models::user::{Principal, Store, User};
use crate::services::ratings::{
    RatingError, RatingService, StoreAverages, StoreRatings, UserRatings,
};

/// Headline counts for the admin dashboard.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_users: usize,
    pub total_stores: usize,
    pub total_ratings: i64,
}

/// Admin view: every user plus every store's aggregate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    #[serde(flatten)]
    pub totals: Totals,
    pub users: Vec<User>,
    pub store_averages: StoreAverages,
}

/// User view: the store list, the caller's ratings, and every aggregate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDashboard {
    pub stores: Vec<Store>,
    pub my_ratings: UserRatings,
    pub store_averages: StoreAverages,
}

/// Dashboard service.
pub struct DashboardService<'a> {
    users: UserRepository<'a>,
    ratings: RatingRepository<'a>,
    ledger: RatingService<'a>,
}

impl<'a> DashboardService<'a> {
    /// Create a new dashboard service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            ratings: RatingRepository::new(pool),
            ledger: RatingService::new(pool),
        }
    }

    /// # Errors
    ///
    /// Returns `RatingError::Repository` if any query fails.
    pub async fn admin(&self) -> Result<AdminDashboard, RatingError> {
        let users = self.users.list_all().await?;
        let store_averages = self.ledger.averages().await?;
        let total_ratings = self.ratings.count_all().await?;

        Ok(AdminDashboard {
            totals: Totals {
                total_users: users.len(),
                total_stores: store_averages.total_stores,
                total_ratings,
            },
            users,
            store_averages,
        })
    }

    /// # Errors
    ///
    /// Returns `RatingError::Repository` if any query fails.
    pub async fn user(&self, principal: &Principal) -> Result<UserDashboard, RatingError> {
        Ok(UserDashboard {
            stores: self.users.list_stores().await?,
            my_ratings: self.ledger.for_user(principal.id).await?,
            store_averages: self.ledger.averages().await?,
        })
    }

    /// The owner's own store ratings; the store id is the owner's user id.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::StoreNotFound` if the principal is not an `OWNER`.
    pub async fn owner(&self, principal: &Principal) -> Result<StoreRatings, RatingError> {
        self.ledger.for_store(principal.id.as_store()).await
    }
}
