//! `get_json` — one GET, one parsed body.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::transport::JsonTransport;

/// Fetch `url` through `transport` and return its JSON body unmodified.
///
/// Exactly one GET is issued per call; nothing is retried or cached.
///
/// # Errors
/// Returns whatever [`FetchError`] the transport reports.
pub async fn get_json<T>(transport: &T, url: &str) -> Result<Value, FetchError>
where
    T: JsonTransport + ?Sized,
{
    debug!(url, "fetching JSON");
    match transport.get_json(url).await {
        Ok(body) => Ok(body),
        Err(err) => {
            warn!(url, error = %err, "JSON fetch failed");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;

    /// Answers every GET with `response` and records the URLs asked for.
    struct Canned {
        response: Value,
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl JsonTransport for Canned {
        async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
            self.requested.lock().push(url.to_string());
            Ok(self.response.clone())
        }
    }

    struct Unreachable;

    #[async_trait]
    impl JsonTransport for Unreachable {
        async fn get_json(&self, _url: &str) -> Result<Value, FetchError> {
            Err(FetchError::Transport("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn delegates_exactly_one_get() {
        for (url, payload) in [
            ("http://example.com", json!({"payload": true})),
            ("http://example.org", json!({"payload": false})),
        ] {
            let transport = Canned { response: payload.clone(), requested: Mutex::new(Vec::new()) };

            assert_eq!(get_json(&transport, url).await.expect("fetch"), payload);
            assert_eq!(*transport.requested.lock(), vec![url.to_string()]);
        }
    }

    #[tokio::test]
    async fn transport_error_propagates() {
        let err = get_json(&Unreachable, "http://example.com").await.expect_err("should fail");
        assert!(matches!(err, FetchError::Transport(msg) if msg == "connection refused"));
    }

    #[tokio::test]
    async fn works_through_trait_object() {
        let transport: Box<dyn JsonTransport> = Box::new(Canned {
            response: json!([1, 2, 3]),
            requested: Mutex::new(Vec::new()),
        });
        assert_eq!(get_json(transport.as_ref(), "http://x").await.expect("fetch"), json!([1, 2, 3]));
    }
}
