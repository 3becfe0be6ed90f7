//! Store Ratings Core - Shared types library.
//!
//! This crate provides common types used across all store ratings components:
//! - `server` - The JSON API (auth, ratings, dashboards)
//! - `cli` - Command-line tools for migrations and bootstrapping admins
//!
//! # Architecture
//!
//! The core crate contains only types and pure computations - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, roles, rating values and
//!   the derived store aggregate

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
