//! # Manager Test Utilities
//!
//! Shared test utilities for the manager service.
//!
//! This crate provides:
//! - Token builders (`TestTokenBuilder` for user and service tokens)
//! - Platform mock (`MockPlatform` for the refresh, GraphQL and object APIs)
//! - Server harness (`TestManagerServer` for E2E tests)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use manager_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let platform = MockPlatform::start().await;
//!     let server = TestManagerServer::spawn(&platform).await?;
//!
//!     let response = reqwest::get(format!("{}/health", server.url())).await?;
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod platform_mock;
pub mod server_harness;
pub mod token_builders;

// Re-export commonly used items
pub use platform_mock::*;
pub use server_harness::*;
pub use token_builders::*;
