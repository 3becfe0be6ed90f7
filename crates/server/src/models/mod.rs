//! Domain models for the ratings service.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`]. Everything here serializes with camelCase keys so it can
//! be returned directly inside the response envelope.

pub mod rating;
pub mod user;

pub use rating::{
    Rating, RatingWrite, StoreAverageEntry, StoreRatingEntry, UserRatingEntry,
};
pub use user::{NewUser, Principal, Store, User};
