//! User identity taken from platform-issued tokens.

pub mod claims;

pub use claims::{HasuraClaims, HASURA_CLAIMS_NAMESPACE};
