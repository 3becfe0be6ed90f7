//! Rating values and the per-store aggregate derived from them.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Error returned when a number is not a valid star rating.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rating must be between {min} and {max}, got {value}", min = RatingValue::MIN, max = RatingValue::MAX)]
pub struct RatingValueError {
    /// The rejected value.
    pub value: i64,
}

/// A star rating between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RatingValue(u8);

impl RatingValue {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validate a raw number as a rating.
    ///
    /// # Errors
    ///
    /// Returns `RatingValueError` if `value` is outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, RatingValueError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingValueError { value })
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn as_i32(self) -> i32 {
        i32::from(self.0)
    }
}

impl<'de> Deserialize<'de> for RatingValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<i32> for RatingValue {
    type Error = RatingValueError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

/// Average and count of the ratings a store has received.
///
/// Never persisted; always recomputed from the ledger. The average is
/// rounded half-up to one decimal place and is `0` for a store with no
/// ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreAggregate {
    #[serde(with = "rust_decimal::serde::float")]
    pub average_rating: Decimal,
    pub total_ratings: i64,
}

impl StoreAggregate {
    /// Aggregate for a store nobody has rated yet.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            average_rating: Decimal::ZERO,
            total_ratings: 0,
        }
    }

    /// Build the aggregate from the sum and count of a store's ratings.
    ///
    /// A non-positive count yields [`StoreAggregate::empty`].
    #[must_use]
    pub fn from_sum(sum: i64, count: i64) -> Self {
        if count <= 0 {
            return Self::empty();
        }

        let average_rating = Decimal::from(sum)
            .checked_div(Decimal::from(count))
            .map_or(Decimal::ZERO, |mean| {
                mean.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
            });

        Self {
            average_rating,
            total_ratings: count,
        }
    }

    /// Build the aggregate directly from a set of rating values.
    #[must_use]
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = RatingValue>,
    {
        let (sum, count) = values
            .into_iter()
            .fold((0_i64, 0_i64), |(sum, count), v| {
                (sum + i64::from(v.get()), count + 1)
            });
        Self::from_sum(sum, count)
    }
}

impl Default for StoreAggregate {
    fn default() -> Self {
        Self::empty()
    }
}
