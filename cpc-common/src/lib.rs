//! Common types and utilities shared across the CPC optimizer crates.
//!
//! This crate defines the shared error type and the observability helpers
//! used throughout the workspace. It stays dependency-light so that every
//! crate can depend on it.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`CpcError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use cpc_common::{CpcError, Result};
//!
//! fn needs_token(token: &str) -> Result<&str> {
//!     if token.is_empty() {
//!         return Err(CpcError::Config("missing token".into()));
//!     }
//!     Ok(token)
//! }
//!
//! assert!(needs_token("").is_err());
//! assert_eq!(needs_token("abc").unwrap(), "abc");
//! ```

pub mod observability;

/// Error types used across the CPC optimizer.
#[derive(thiserror::Error, Debug)]
pub enum CpcError {
    /// The LLM provider rejected or failed a completion request.
    #[error("LLM error: {0}")]
    Llm(String),

    /// An outbound HTTP exchange failed below the provider level.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation exceeded its deadline.
    #[error("Timeout occurred")]
    Timeout,

    /// Anything else, carried with its context chain.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`CpcError`].
pub type Result<T> = std::result::Result<T, CpcError>;
