//! HTTP client for the gateway's status endpoints.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use crate::error::ScrapeError;
use crate::models::Model;

/// Fetches and decodes one endpoint per call. Holds no per-scrape state, so a
/// clone can be shared by every collector.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    client: reqwest::Client,
    target: String,
    timeout: Duration,
}

impl DeviceClient {
    /// Create a client for the device at `target` (`host` or `host:port`).
    pub fn new(target: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), target, timeout)
    }

    /// Create a client reusing an existing connection pool.
    pub fn with_client(
        client: reqwest::Client,
        target: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            target: target.into(),
            timeout,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET the endpoint of `M` and decode the body. No retries.
    pub async fn scrape<M: Model>(&self) -> Result<M, ScrapeError> {
        let url = M::ENDPOINT.url(&self.target);
        trace!(url = %url, timeout_ms = self.timeout.as_millis() as u64, "Scraping device endpoint");

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| ScrapeError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScrapeError::HttpStatus { url, status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ScrapeError::Transport {
                url: url.clone(),
                source,
            })?;

        trace!(url = %url, bytes = body.len(), "Received device response");

        decode_body(&body).map_err(|source| ScrapeError::Decode { url, source })
    }
}

/// Decode a device response body.
///
/// The device reports absent values as `null` about as often as it leaves
/// them out, so nulls are treated the same as missing fields.
pub fn decode_body<M: DeserializeOwned>(body: &[u8]) -> Result<M, serde_json::Error> {
    let mut value: Value = serde_json::from_slice(body)?;
    strip_nulls(&mut value);
    serde_json::from_value(value)
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Null => *value = Value::Object(Default::default()),
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}
