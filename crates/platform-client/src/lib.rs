//! Authenticated client for the learning platform's GraphQL API.
//!
//! The platform issues short-lived JWTs. This crate decodes them, detects
//! expiry, refreshes them through the platform's refresh endpoint, caches the
//! current token, and attaches it to every GraphQL call.
//!
//! Callers depend on two entry points only:
//!
//! - [`jwt::decode`] to read claims (identity, roles) out of a token
//! - [`PlatformClient::run`] to execute a query or mutation

#![warn(clippy::pedantic)]

/// Module for the authenticated GraphQL client
pub mod client;

/// Module for client configuration
pub mod config;

/// Module for client error types
pub mod error;

/// Module for GraphQL wire types
pub mod graphql;

/// Module for JWT payload decoding and expiry checks
pub mod jwt;

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for the in-process token cache
pub mod token_cache;

/// Module for durable token persistence
pub mod token_store;

pub use client::{GraphqlExecutor, PlatformClient};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use jwt::{Claims, TokenError};
pub use token_cache::TokenCache;
pub use token_store::{EnvFileTokenStore, InMemoryTokenStore, TokenStore};
