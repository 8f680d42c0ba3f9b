//! Track Manager Service Library
//!
//! HTTP API in front of the learning platform for one campus:
//!
//! - Campus metadata and course listing
//! - Course registration and removal for the calling user
//! - User identity taken from the platform token in `x-token`
//!
//! Every GraphQL call goes through `platform_client::PlatformClient`, which
//! keeps the service's own platform token fresh.
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> platform_client
//! ```
//!
//! # Modules
//!
//! - `auth` - Hasura claims of user tokens
//! - `config` - Service configuration from environment and platform file
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - User token and HTTP metrics middleware
//! - `models` - Request and response bodies
//! - `observability` - Prometheus metrics
//! - `routes` - Axum router setup
//! - `services` - Platform object API and GraphQL operations

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
