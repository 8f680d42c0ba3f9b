//! JWT payload decoding and expiry checks.
//!
//! The platform signs its tokens, but this crate never verifies signatures:
//! decoding is purely informational. Tokens are exchanged with the platform
//! over TLS and the platform itself rejects forged credentials.
//!
//! # Format
//!
//! A token is `header.payload.signature`, each segment base64url encoded
//! without padding. Only the payload is read.
//!
//! # Usage
//!
//! ```rust
//! use platform_client::jwt::{decode, is_expired};
//!
//! // {"exp":1} base64url encoded
//! let token = "e30.eyJleHAiOjF9.sig";
//! let claims = decode(token).unwrap();
//! assert!(is_expired(&claims));
//! ```

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{Map, Value};
use thiserror::Error;

/// Claims carried in a token payload.
pub type Claims = Map<String, Value>;

/// Name of the expiration claim (Unix epoch seconds).
pub const EXP_CLAIM: &str = "exp";

// =============================================================================
// Error Types
// =============================================================================

/// Errors produced while reading a token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token structure, base64 or JSON is invalid.
    #[error("Malformed token: {0}")]
    Malformed(&'static str),

    /// A claim the caller needs is absent or has the wrong type.
    #[error("Missing or invalid claim: {0}")]
    ClaimMissing(String),
}

// =============================================================================
// Functions
// =============================================================================

/// Convert a base64url segment into padded standard base64.
///
/// Replaces `-` with `+` and `_` with `/`, then appends `=` until the length
/// is a multiple of four.
///
/// # Errors
///
/// Returns `TokenError::Malformed` when `len % 4 == 1`. No amount of padding
/// makes such a segment valid base64.
pub fn restore_padding(segment: &str) -> Result<String, TokenError> {
    let mut restored = segment.replace('-', "+").replace('_', "/");
    match restored.len() % 4 {
        0 => {}
        2 => restored.push_str("=="),
        3 => restored.push('='),
        _ => {
            tracing::debug!(
                target: "platform.jwt",
                segment_len = segment.len(),
                "Token rejected: payload length is not valid base64"
            );
            return Err(TokenError::Malformed("invalid payload length"));
        }
    }
    Ok(restored)
}

/// Decode the claims of a token without verifying its signature.
///
/// # Errors
///
/// Returns `TokenError::Malformed` if:
/// - the token has fewer than two dot-separated segments
/// - the payload is not base64url
/// - the decoded payload is not a JSON object
pub fn decode(token: &str) -> Result<Claims, TokenError> {
    let payload = token.split('.').nth(1).ok_or_else(|| {
        tracing::debug!(target: "platform.jwt", "Token rejected: missing payload segment");
        TokenError::Malformed("missing payload segment")
    })?;

    let bytes = STANDARD.decode(restore_padding(payload)?).map_err(|e| {
        tracing::debug!(target: "platform.jwt", error = %e, "Failed to decode token payload base64");
        TokenError::Malformed("payload is not valid base64")
    })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!(target: "platform.jwt", error = %e, "Failed to parse token payload JSON");
        TokenError::Malformed("payload is not a JSON object")
    })
}

/// Read the numeric `exp` claim.
#[must_use]
pub fn expires_at(claims: &Claims) -> Option<f64> {
    claims.get(EXP_CLAIM).and_then(Value::as_f64)
}

/// Check whether the claims are expired at the current time.
///
/// A missing or non-numeric `exp` counts as expired so the caller refreshes.
#[must_use]
pub fn is_expired(claims: &Claims) -> bool {
    is_expired_at(claims, chrono::Utc::now().timestamp())
}

/// Check whether the claims are expired at `now` (Unix epoch seconds).
///
/// Expired when `exp - now <= 0`. There is no grace window.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn is_expired_at(claims: &Claims, now: i64) -> bool {
    match expires_at(claims) {
        Some(exp) => exp - now as f64 <= 0.0,
        None => true,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::json;

    fn token_with_payload(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload);
        format!("{header}.{body}.signature")
    }

    fn claims(value: Value) -> Claims {
        value.as_object().cloned().unwrap()
    }

    // -------------------------------------------------------------------------
    // restore_padding Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_restore_padding_remainder_zero() {
        assert_eq!(restore_padding("abcd").unwrap(), "abcd");
    }

    #[test]
    fn test_restore_padding_remainder_two() {
        assert_eq!(restore_padding("ab").unwrap(), "ab==");
    }

    #[test]
    fn test_restore_padding_remainder_three() {
        assert_eq!(restore_padding("abc").unwrap(), "abc=");
    }

    #[test]
    fn test_restore_padding_rejects_remainder_one() {
        assert_eq!(
            restore_padding("abcde"),
            Err(TokenError::Malformed("invalid payload length"))
        );
    }

    #[test]
    fn test_restore_padding_reverses_url_safe_alphabet() {
        assert_eq!(restore_padding("a-b_").unwrap(), "a+b/");
    }

    // -------------------------------------------------------------------------
    // decode Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_decode_returns_payload_claims() {
        let payload = json!({
            "sub": "42",
            "exp": 1_700_000_000,
            "https://hasura.io/jwt/claims": {
                "x-hasura-user-id": "42",
                "x-hasura-allowed-roles": ["user"]
            }
        });
        let token = token_with_payload(&payload.to_string());

        let decoded = decode(&token).unwrap();

        assert_eq!(Value::Object(decoded), payload);
    }

    #[test]
    fn test_decode_every_padding_class() {
        let mut remainders = Vec::new();
        for filler in ["", "a", "ab"] {
            let payload = format!(r#"{{"exp":1700000000,"f":"{filler}"}}"#);
            let segment = URL_SAFE_NO_PAD.encode(&payload);
            remainders.push(segment.len() % 4);

            let decoded = decode(&format!("h.{segment}.s")).unwrap();
            assert_eq!(decoded["f"], filler);
        }
        remainders.sort_unstable();
        assert_eq!(remainders, vec![0, 2, 3]);
    }

    #[test]
    fn test_decode_handles_url_safe_characters() {
        // "???" lands on a 3-byte boundary and encodes to "Pz8_"
        let payload = r#"{"q":"???"}"#;
        let segment = URL_SAFE_NO_PAD.encode(payload);
        assert!(segment.contains('_'));

        let decoded = decode(&format!("h.{segment}.s")).unwrap();
        assert_eq!(decoded["q"], "???");
    }

    #[test]
    fn test_decode_accepts_two_segments() {
        let segment = URL_SAFE_NO_PAD.encode(r#"{"exp":1}"#);
        let decoded = decode(&format!("h.{segment}")).unwrap();
        assert_eq!(decoded["exp"], 1);
    }

    #[test]
    fn test_decode_ignores_signature() {
        let token = token_with_payload(r#"{"exp":1}"#);
        let tampered = format!("{}.not-a-real-signature", token.rsplit_once('.').unwrap().0);

        assert_eq!(decode(&token).unwrap(), decode(&tampered).unwrap());
    }

    #[test]
    fn test_decode_rejects_single_segment() {
        assert_eq!(
            decode("not-a-jwt"),
            Err(TokenError::Malformed("missing payload segment"))
        );
    }

    #[test]
    fn test_decode_rejects_empty_token() {
        assert!(matches!(decode(""), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        assert_eq!(
            decode("header.!!!!.signature"),
            Err(TokenError::Malformed("payload is not valid base64"))
        );
    }

    #[test]
    fn test_decode_rejects_remainder_one_payload() {
        assert_eq!(
            decode("header.abcde.signature"),
            Err(TokenError::Malformed("invalid payload length"))
        );
    }

    #[test]
    fn test_decode_rejects_non_json_payload() {
        let token = token_with_payload("not-json");
        assert_eq!(
            decode(&token),
            Err(TokenError::Malformed("payload is not a JSON object"))
        );
    }

    #[test]
    fn test_decode_rejects_json_array_payload() {
        let token = token_with_payload("[1,2,3]");
        assert!(matches!(decode(&token), Err(TokenError::Malformed(_))));
    }

    // -------------------------------------------------------------------------
    // Expiry Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_is_expired_at_future_exp() {
        let now = 1_700_000_000_i64;
        assert!(!is_expired_at(&claims(json!({"exp": now + 1})), now));
    }

    #[test]
    fn test_is_expired_at_boundary_is_expired() {
        let now = 1_700_000_000_i64;
        assert!(is_expired_at(&claims(json!({"exp": now})), now));
    }

    #[test]
    fn test_is_expired_at_past_exp() {
        let now = 1_700_000_000_i64;
        assert!(is_expired_at(&claims(json!({"exp": now - 3600})), now));
    }

    #[test]
    fn test_is_expired_at_fractional_exp() {
        let now = 1_700_000_000_i64;
        assert!(!is_expired_at(&claims(json!({"exp": 1_700_000_000.5})), now));
        assert!(is_expired_at(&claims(json!({"exp": 1_699_999_999.5})), now));
    }

    #[test]
    fn test_is_expired_when_exp_missing() {
        assert!(is_expired(&claims(json!({"sub": "42"}))));
    }

    #[test]
    fn test_is_expired_when_exp_not_numeric() {
        let future = (chrono::Utc::now().timestamp() + 3600).to_string();
        assert!(is_expired(&claims(json!({"exp": future}))));
        assert!(is_expired(&claims(json!({"exp": null}))));
    }

    #[test]
    fn test_is_expired_uses_current_time() {
        let now = chrono::Utc::now().timestamp();
        assert!(!is_expired(&claims(json!({"exp": now + 3600}))));
        assert!(is_expired(&claims(json!({"exp": now - 1}))));
    }

    #[test]
    fn test_expires_at_reads_number() {
        assert_eq!(expires_at(&claims(json!({"exp": 12}))), Some(12.0));
        assert_eq!(expires_at(&claims(json!({}))), None);
    }
}
