//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. CORS (credentials allowed for the configured origins)
//! 3. `TraceLayer` (`http_request` span)
//! 4. Request ID (recorded on the span)
//!
//! The access gate is not a layer: handlers opt in through the
//! [`RequireAuth`] and [`RequireAdmin`] extractors.

pub mod auth;
pub mod request_id;

pub use auth::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, RequireAdmin, RequireAuth};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
