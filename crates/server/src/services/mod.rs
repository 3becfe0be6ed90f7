//! Business logic services.
//!
//! - `auth` - Accounts, passwords, and tokens
//! - `ratings` - The rating ledger and store aggregates
//! - `dashboard` - Per-role read views over users and ratings
//!
//! Services borrow the pool from [`crate::state::AppState`] and are built per
//! request; they hold no state of their own.

pub mod auth;
pub mod dashboard;
pub mod ratings;
