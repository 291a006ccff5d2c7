//! Remote configuration source.
//!
//! [`ConfigSource`] is the seam between the reconciler and the network: the
//! production implementation polls the signage backend over HTTP, tests
//! script responses. Every failure is local-only by design — the poll loop
//! logs it and leaves the display untouched, and the next scheduled poll
//! retries. Nothing here is ever surfaced to the viewer.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use thiserror::Error;
use url::Url;

use crate::protocol::RemoteConfig;
use crate::settings::Settings;

/// Why a single poll produced no configuration. Both kinds recover the same
/// way (log, keep current state, retry on the next tick); they are separate
/// so callers and tests can observe what went wrong.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PollError {
    /// The network call failed or the endpoint returned a non-success status.
    #[error("config fetch failed: {0}")]
    Fetch(String),

    /// The response body was not a valid configuration document.
    #[error("config response could not be parsed: {0}")]
    Parse(String),
}

/// Why the HTTP source could not be constructed at startup.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid endpoint base: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// A source of remote display configuration.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Issue one poll. Must not block the caller beyond its own await.
    async fn fetch(&self) -> Result<RemoteConfig, PollError>;
}

/// Polls `GET {endpoint_base}/signage/config?deviceId={id}` with cache-bypass
/// headers so intermediaries never serve a stale record.
pub struct HttpConfigSource {
    client: Client,
    endpoint: Url,
    device_id: String,
}

impl HttpConfigSource {
    pub fn new(settings: &Settings) -> Result<Self, ClientError> {
        let base = settings.endpoint_base.trim_end_matches('/');
        let endpoint = Url::parse(&format!("{base}/signage/config"))?;
        let client = Client::builder().timeout(settings.request_timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            device_id: settings.device_id.clone(),
        })
    }

    /// The exact URL a poll will request, device id included.
    pub fn request_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("deviceId", &self.device_id);
        url
    }
}

#[async_trait]
impl ConfigSource for HttpConfigSource {
    async fn fetch(&self) -> Result<RemoteConfig, PollError> {
        let response = self
            .client
            .get(self.request_url())
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| PollError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Fetch(format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PollError::Fetch(e.to_string()))?;

        RemoteConfig::parse(&body).map_err(|e| PollError::Parse(e.to_string()))
    }
}
