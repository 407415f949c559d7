//! Common types shared across the session join crates.

#![warn(clippy::pedantic)]

/// Module for common error types
pub mod error;

/// Module for roles and session identifiers
pub mod types;

/// Module for secret types that prevent accidental logging
pub mod secret;
