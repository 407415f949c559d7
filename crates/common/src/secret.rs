//! Secret types for keeping the API token out of logs.
//!
//! Re-exports [`secrecy`] types. `SecretString` implements `Debug` with
//! redaction, so a config struct that derives `Debug` stays safe to log
//! through `{:?}` or tracing fields. The inner value is zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct ApiCredentials {
//!     base_url: String,
//!     token: SecretString,  // Safe: Debug shows "[REDACTED]"
//! }
//!
//! let creds = ApiCredentials {
//!     base_url: "https://api.example.com".to_string(),
//!     token: SecretString::from("eyJhbGciOi"),
//! };
//!
//! // This is safe - the token is redacted
//! println!("{:?}", creds);
//!
//! // To access the actual value, you must explicitly call expose_secret()
//! let token: &str = creds.token.expose_secret();
//! ```
//!
//! # Usage Guidelines
//!
//! Use `SecretString` for the dashboard API bearer token and anything else
//! that would let a log reader act as the signed-in user.
//!
//! # Serde Integration
//!
//! With the `serde` feature enabled, secrets can be deserialized from JSON:
//!
//! ```rust
//! use serde::Deserialize;
//! use common::secret::SecretString;
//!
//! #[derive(Debug, Deserialize)]
//! struct StoredLogin {
//!     user_id: String,
//!     token: SecretString,
//! }
//!
//! let json = r#"{"user_id": "tutor-42", "token": "secret-key"}"#;
//! let login: StoredLogin = serde_json::from_str(json).unwrap();
//!
//! // Debug output is safe
//! println!("{:?}", login);
//! // user_id is visible, token is redacted
//! ```

// Re-export the main types from secrecy
pub use secrecy::{ExposeSecret, SecretString};

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("bearer-abc");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("bearer-abc"));
    }

    #[test]
    fn test_expose_secret_returns_inner_value() {
        let secret = SecretString::from("token123");
        assert_eq!(secret.expose_secret(), "token123");
    }

    #[test]
    fn test_deserialize_keeps_token_out_of_debug() {
        #[allow(dead_code)]
        #[derive(Debug, Deserialize)]
        struct StoredLogin {
            user_id: String,
            token: SecretString,
        }

        let json = r#"{"user_id": "student-7", "token": "my-secret-value"}"#;
        let login: StoredLogin = serde_json::from_str(json).expect("deserialize");

        assert_eq!(login.token.expose_secret(), "my-secret-value");

        let debug = format!("{login:?}");
        assert!(debug.contains("student-7"));
        assert!(!debug.contains("my-secret-value"));
        assert!(debug.contains("REDACTED"));
    }
}
