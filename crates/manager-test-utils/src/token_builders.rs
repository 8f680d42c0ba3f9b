//! Builder patterns for test tokens
//!
//! Tokens are real HS256 JWTs, shaped like the ones the platform issues:
//! a Hasura claims namespace carrying the user id (as a string) and the
//! allowed roles.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Map, Value};

/// Secret used to sign test tokens. Nothing verifies it.
pub const TEST_SIGNING_SECRET: &[u8] = b"manager-test-signing-secret";

/// Hasura claims namespace.
const HASURA_NAMESPACE: &str = "https://hasura.io/jwt/claims";

/// Builder for creating test platform tokens
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_user(42)
///     .with_roles(&["user", "admin"])
///     .expires_in(3600)
///     .build();
/// ```
pub struct TestTokenBuilder {
    sub: String,
    user_id: Option<String>,
    roles: Option<Vec<String>>,
    default_role: String,
    hasura: bool,
    exp: Option<i64>,
    iat: i64,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults (user 1, role `user`, valid 1h)
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            sub: "1".to_string(),
            user_id: Some("1".to_string()),
            roles: Some(vec!["user".to_string()]),
            default_role: "user".to_string(),
            hasura: true,
            exp: Some((now + Duration::seconds(3600)).timestamp()),
            iat: now.timestamp(),
        }
    }

    /// Token for the manager service itself (no Hasura user)
    pub fn service() -> Self {
        Self::new().for_subject("manager-service").without_hasura_claims()
    }

    /// Set the platform user id (also used as `sub`)
    pub fn for_user(mut self, user_id: i64) -> Self {
        self.sub = user_id.to_string();
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Set the subject only
    pub fn for_subject(mut self, subject: &str) -> Self {
        self.sub = subject.to_string();
        self
    }

    /// Set a raw user id claim, e.g. a non-numeric one
    pub fn with_raw_user_id(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Drop the user id claim
    pub fn without_user_id(mut self) -> Self {
        self.user_id = None;
        self
    }

    /// Set the allowed roles
    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.roles = Some(roles.iter().map(|r| r.to_string()).collect());
        self
    }

    /// Drop the allowed roles claim
    pub fn without_roles(mut self) -> Self {
        self.roles = None;
        self
    }

    /// Drop the whole Hasura namespace
    pub fn without_hasura_claims(mut self) -> Self {
        self.hasura = false;
        self
    }

    /// Set expiration in seconds from now (negative for an expired token)
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = Some((Utc::now() + Duration::seconds(seconds)).timestamp());
        self
    }

    /// Drop the `exp` claim
    pub fn without_expiry(mut self) -> Self {
        self.exp = None;
        self
    }

    /// Build the claims as a JSON value
    pub fn build_claims(self) -> Value {
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!(self.sub));
        claims.insert("iat".to_string(), json!(self.iat));
        if let Some(exp) = self.exp {
            claims.insert("exp".to_string(), json!(exp));
        }

        if self.hasura {
            let mut hasura = Map::new();
            hasura.insert(
                "x-hasura-default-role".to_string(),
                json!(self.default_role),
            );
            if let Some(user_id) = self.user_id {
                hasura.insert("x-hasura-user-id".to_string(), json!(user_id));
            }
            if let Some(roles) = self.roles {
                hasura.insert("x-hasura-allowed-roles".to_string(), json!(roles));
            }
            claims.insert(HASURA_NAMESPACE.to_string(), Value::Object(hasura));
        }

        Value::Object(claims)
    }

    /// Build a signed token
    pub fn build(self) -> String {
        let claims = self.build_claims();
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SIGNING_SECRET),
        )
        .expect("test token encoding should succeed")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
