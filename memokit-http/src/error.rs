//! Fetch error types.

use thiserror::Error;

/// Errors that can occur while fetching JSON.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The GET could not be completed (DNS, connect, TLS, reset, ...).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The GET did not complete within the configured timeout.
    #[error("Request to {url} timed out")]
    Timeout {
        /// The URL that was requested.
        url: String,
    },

    /// The response body was not valid JSON.
    #[error("Failed to parse response as JSON: {0}")]
    Decode(String),

    /// The HTTP client could not be built from the configuration.
    #[error("HTTP configuration error: {0}")]
    Config(String),

    /// A lookup into a fetched body failed.
    #[error(transparent)]
    Lookup(#[from] memokit_core::MemokitError),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: err.url().map(ToString::to_string).unwrap_or_default(),
            }
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}
