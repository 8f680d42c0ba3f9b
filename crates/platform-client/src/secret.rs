//! Secret types for protecting platform tokens from accidental logging.
//!
//! Re-exports the [`secrecy`] types used for every token held by this crate.
//! `SecretString` implements `Debug` with redaction, so any struct that
//! derives `Debug` and holds a token is safe to log. The value is zeroized
//! on drop.
//!
//! # Example
//!
//! ```rust
//! use platform_client::secret::{ExposeSecret, SecretString};
//!
//! let token = SecretString::from("header.payload.signature");
//! assert!(!format!("{token:?}").contains("payload"));
//!
//! let header = format!("Bearer {}", token.expose_secret());
//! assert!(header.ends_with("signature"));
//! ```

pub use secrecy::{ExposeSecret, SecretString};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let token = SecretString::from("eyJhbGciOi.eyJleHAi.c2ln");
        let debug_str = format!("{token:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("eyJleHAi"));
    }

    #[test]
    fn test_struct_holding_token_is_safe() {
        #[allow(dead_code)]
        #[derive(Debug)]
        struct Session {
            domain: String,
            token: SecretString,
        }

        let session = Session {
            domain: "platform.example.com".to_string(),
            token: SecretString::from("super-secret-token"),
        };

        let debug_str = format!("{session:?}");
        assert!(debug_str.contains("platform.example.com"));
        assert!(!debug_str.contains("super-secret-token"));
    }

    #[test]
    fn test_clone_keeps_value() {
        let token = SecretString::from("cloneable");
        assert_eq!(token.clone().expose_secret(), "cloneable");
    }
}
