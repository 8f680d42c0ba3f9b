//! Hasura claims carried by platform user tokens.
//!
//! The platform signs the tokens it hands to browsers; this service only
//! reads them to learn who is calling. The user id is redacted in Debug
//! output.

use platform_client::{Claims, TokenError};
use serde::Deserialize;
use std::fmt;

/// Claim namespace holding the Hasura session variables.
pub const HASURA_CLAIMS_NAMESPACE: &str = "https://hasura.io/jwt/claims";

/// Session variable holding the user id, as a decimal string.
pub const USER_ID_CLAIM: &str = "x-hasura-user-id";

/// Session variable holding the roles the user may assume.
pub const ALLOWED_ROLES_CLAIM: &str = "x-hasura-allowed-roles";

/// Hasura session variables of a user token.
///
/// Every field is optional at decode time so that a token lacking the user
/// id can still answer a roles query and vice versa.
#[derive(Clone, Deserialize)]
pub struct HasuraClaims {
    #[serde(rename = "x-hasura-user-id")]
    user_id: Option<String>,

    #[serde(rename = "x-hasura-allowed-roles")]
    allowed_roles: Option<Vec<String>>,

    #[serde(rename = "x-hasura-default-role")]
    default_role: Option<String>,
}

impl fmt::Debug for HasuraClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HasuraClaims")
            .field("user_id", &"[REDACTED]")
            .field("allowed_roles", &self.allowed_roles)
            .field("default_role", &self.default_role)
            .finish()
    }
}

impl HasuraClaims {
    /// Read the Hasura namespace out of decoded token claims.
    pub fn from_claims(claims: &Claims) -> Result<Self, TokenError> {
        let namespace = claims
            .get(HASURA_CLAIMS_NAMESPACE)
            .ok_or_else(|| TokenError::ClaimMissing(HASURA_CLAIMS_NAMESPACE.to_string()))?;

        serde_json::from_value(namespace.clone()).map_err(|e| {
            tracing::debug!(target: "manager.auth.claims", error = %e, "Hasura claims have unexpected types");
            TokenError::ClaimMissing(HASURA_CLAIMS_NAMESPACE.to_string())
        })
    }

    /// Decode `token` and read its Hasura namespace.
    pub fn from_token(token: &str) -> Result<Self, TokenError> {
        let claims = platform_client::jwt::decode(token)?;
        Self::from_claims(&claims)
    }

    /// Numeric user id.
    pub fn user_id(&self) -> Result<i64, TokenError> {
        let raw = self
            .user_id
            .as_deref()
            .ok_or_else(|| TokenError::ClaimMissing(USER_ID_CLAIM.to_string()))?;

        raw.trim()
            .parse()
            .map_err(|_| TokenError::ClaimMissing(USER_ID_CLAIM.to_string()))
    }

    /// Roles the user may assume.
    pub fn allowed_roles(&self) -> Result<&[String], TokenError> {
        self.allowed_roles
            .as_deref()
            .ok_or_else(|| TokenError::ClaimMissing(ALLOWED_ROLES_CLAIM.to_string()))
    }

    /// Role used when the request does not pick one.
    pub fn default_role(&self) -> Option<&str> {
        self.default_role.as_deref()
    }
}
