//! JSON GET transport — the seam between fetching code and the network.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use memokit_core::config::HttpConfig;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::FetchError;

/// Something that can GET a URL and hand back its JSON body.
#[async_trait]
pub trait JsonTransport: Send + Sync {
    /// Issue one GET to `url` and return the parsed body.
    async fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

#[async_trait]
impl<T: JsonTransport + ?Sized> JsonTransport for Arc<T> {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        (**self).get_json(url).await
    }
}

#[async_trait]
impl<T: JsonTransport + ?Sized> JsonTransport for &T {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        (**self).get_json(url).await
    }
}

/// [`JsonTransport`] backed by a shared `reqwest` client.
///
/// The HTTP status is not inspected: whatever JSON the server sends back is
/// the result. A body that is not JSON is a [`FetchError::Decode`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Build a transport with the configured timeout and user agent.
    ///
    /// # Errors
    /// Returns `FetchError::Config` if the client cannot be built.
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;
        Ok(Self { http })
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl JsonTransport for ReqwestTransport {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let start = Instant::now();
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.json::<Value>().await?;

        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(url, %status, latency_ms, "GET completed");
        Ok(body)
    }
}
