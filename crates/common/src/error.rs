//! Common error types for the session join crates.

use thiserror::Error;

/// Errors raised while parsing shared vocabulary types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// Session identifier was empty once role prefixes were removed
    #[error("Invalid session id: {0:?}")]
    InvalidSessionId(String),

    /// Role name did not match any known dashboard role
    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

/// Result type alias using `CommonError`
pub type Result<T> = std::result::Result<T, CommonError>;
