//! Middleware for the manager service.
//!
//! # Components
//!
//! - `user_token` - Reads the caller's identity from the `x-token` header
//! - `http_metrics` - HTTP request metrics middleware

pub mod http_metrics;
pub mod user_token;

pub use http_metrics::http_metrics_middleware;
pub use user_token::{require_user_token, USER_TOKEN_HEADER};
