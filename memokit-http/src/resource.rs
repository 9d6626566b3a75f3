//! Memoized JSON resource.
//!
//! A URL whose body is fetched once and then served from memory. Concurrent
//! first readers share a single GET; a failed GET is reported to the caller
//! and leaves the resource unloaded, so the next read tries again.

use memokit_core::access_nested_map;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::trace;

use crate::error::FetchError;
use crate::fetch::get_json;
use crate::transport::JsonTransport;

/// A remote JSON document, fetched on first read.
#[derive(Debug)]
pub struct JsonResource<T> {
    url: String,
    transport: T,
    body: OnceCell<Value>,
}

impl<T: JsonTransport> JsonResource<T> {
    /// A resource for `url`, not yet fetched.
    pub fn new(url: impl Into<String>, transport: T) -> Self {
        Self {
            url: url.into(),
            transport,
            body: OnceCell::new(),
        }
    }

    /// The resource's URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The document body, fetched on the first successful call only.
    ///
    /// # Errors
    /// Returns the transport's error; nothing is cached in that case.
    pub async fn value(&self) -> Result<&Value, FetchError> {
        if let Some(body) = self.body.get() {
            trace!(url = %self.url, "JSON resource served from cache");
            return Ok(body);
        }
        self.body
            .get_or_try_init(|| get_json(&self.transport, &self.url))
            .await
    }

    /// Fetch (if needed) and walk `path` into the body.
    ///
    /// # Errors
    /// Returns the fetch error, or [`FetchError::Lookup`] naming the first
    /// missing key.
    pub async fn lookup<K: AsRef<str>>(&self, path: &[K]) -> Result<&Value, FetchError> {
        let body = self.value().await?;
        Ok(access_nested_map(body, path)?)
    }

    /// Whether the body has been fetched successfully.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.body.initialized()
    }

    /// The body, only if it has already been fetched.
    #[must_use]
    pub fn cached(&self) -> Option<&Value> {
        self.body.get()
    }
}
