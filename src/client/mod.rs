//! Clients for the two remote services
//!
//! - `metal`: node network acquisition
//! - `garden`: cluster lifecycle
//!
//! Both follow the same shape: an async trait the commands depend on, a
//! reqwest implementation, and a call-counting mock for tests.

use std::time::Duration;

use thiserror::Error;

pub mod garden;
pub mod metal;

pub use garden::{GardenClient, GardenClientTrait};
pub use metal::{
    MetalClient, MetalClientTrait, Network, NetworkAcquireRequest, NetworkAcquireResult,
};

/// Default request timeout for both services
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Parse(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Shared HTTP plumbing of both clients
#[derive(Clone)]
pub(crate) struct HttpBackend {
    client: reqwest::Client,
    base_url: reqwest::Url,
    api_token: Option<String>,
}

impl HttpBackend {
    pub(crate) fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        let base_url = reqwest::Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            client,
            base_url,
            api_token,
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Resolve path segments against the base URL.
    ///
    /// Each segment is percent-encoded as a whole, so a `/`, `?` or `#`
    /// inside an id can never address another resource.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<reqwest::Url, ClientError> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(ClientError::InvalidUrl(format!(
                "'{}' is not a valid path segment",
                bad
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn request(
        &self,
        method: reqwest::Method,
        segments: &[&str],
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let url = self.url(segments)?;
        tracing::debug!("{} {}", method, url);
        let mut req = self.client.request(method, url);
        if let Some(ref token) = self.api_token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        Ok(req)
    }

    /// Send a request and decode a JSON body, mapping non-success statuses
    /// to [`ClientError::Api`].
    pub(crate) async fn send<T: serde::de::DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = req.send().await.map_err(|e| ClientError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }
}

/// Pull `error`/`message` out of a JSON error body, else keep the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value["error"]
            .as_str()
            .or_else(|| value["message"].as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}
