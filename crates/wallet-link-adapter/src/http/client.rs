/*
[INPUT]:  HTTP configuration (backend base URL, optional timeouts)
[OUTPUT]: Configured reqwest client and response decoding helpers
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing response handling
*/

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::http::{LinkError, Result};
use crate::types::ErrorResponse;

/// HTTP client configuration
///
/// Timeouts are left to the transport unless set explicitly.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

/// Client for the challenge/verification backend
#[derive(Debug, Clone)]
pub struct ChallengeClient {
    http_client: Client,
    base_url: Url,
}

impl ChallengeClient {
    /// Create a new client with default configuration
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(ClientConfig::default(), base_url)
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig, base_url: &str) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        let http_client = builder.build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build full URL for an endpoint
    pub(crate) fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint)?)
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http_client.request(method, url)
    }

    /// Send a request and decode a JSON body.
    ///
    /// Non-success statuses are mapped through `on_error` with the backend's
    /// `detail` field, or `fallback` when the body carries none.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        on_error: fn(String) -> LinkError,
        fallback: &str,
    ) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorResponse>(&body)
                .ok()
                .and_then(|error| error.detail)
                .filter(|detail| !detail.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string());
            warn!(status = status.as_u16(), detail = %detail, "backend returned error");
            return Err(on_error(detail));
        }

        Ok(serde_json::from_slice(&body)?)
    }
}
