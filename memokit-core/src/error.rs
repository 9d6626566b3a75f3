//! Error types for the memokit core library.

use thiserror::Error;

/// Top-level error type for memokit core operations.
///
/// Memoization never adds variants of its own: a failing computation's error
/// reaches the caller untouched.
#[derive(Error, Debug)]
pub enum MemokitError {
    /// A key along a nested lookup path was absent, or the value reached
    /// before it was not a mapping.
    #[error("Missing key: '{key}'")]
    MissingKey {
        /// The first key that could not be resolved.
        key: String,
    },

    /// A dotted lookup path could not be parsed.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MemokitError {
    /// The missing key, if this is a [`MemokitError::MissingKey`].
    #[must_use]
    pub fn missing_key(&self) -> Option<&str> {
        match self {
            Self::MissingKey { key } => Some(key),
            _ => None,
        }
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, MemokitError>;
