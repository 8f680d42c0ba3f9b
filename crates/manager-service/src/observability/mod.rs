//! Observability for the manager service.
//!
//! Provides metrics definitions and recording helpers.

pub mod metrics;
