//! Rate-limited HTTP fetcher.
//!
//! [`Fetcher`] throttles requests per remote host through a shared
//! [`HostRateLimiter`] and delegates the actual GET to an [`HttpTransport`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::FeedConfig;
use crate::rate_limit::HostRateLimiter;
use crate::{FlockError, Result};

/// A plain HTTP GET returning the response body.
///
/// Non-2xx statuses and transport failures are errors. Implementations do not
/// retry.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<Vec<u8>>;
}

/// [`HttpTransport`] backed by `reqwest`.
pub struct ReqwestTransport {
    client: Client,
    max_response_bytes: u64,
}

impl ReqwestTransport {
    /// Create a transport using the timeouts and limits in `config`.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FlockError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_response_bytes: config.max_response_bytes,
        })
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_response_bytes {
            return Err(FlockError::Http(format!(
                "response too large: {} bytes (max {} bytes)",
                size, self.max_response_bytes
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FlockError::Http(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FlockError::Http(format!("status {}", response.status())));
        }

        if let Some(content_length) = response.content_length() {
            self.check_size(content_length)?;
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FlockError::Http(format!("failed to read response: {}", e)))?;
        self.check_size(bytes.len() as u64)?;

        Ok(bytes.to_vec())
    }
}

/// Fetcher that spaces out requests to the same host.
pub struct Fetcher {
    transport: Arc<dyn HttpTransport>,
    limiter: Arc<HostRateLimiter>,
}

impl Fetcher {
    /// Create a fetcher over `transport`, throttled by `limiter`.
    pub fn new(transport: Arc<dyn HttpTransport>, limiter: Arc<HostRateLimiter>) -> Self {
        Self { transport, limiter }
    }

    /// The limiter shared by this fetcher.
    pub fn limiter(&self) -> &Arc<HostRateLimiter> {
        &self.limiter
    }

    /// GET `url`, waiting first if the previous request to its host finished
    /// less than `min_interval` ago.
    pub async fn fetch(&self, url: &str, min_interval: Duration) -> Result<Vec<u8>> {
        let parsed =
            Url::parse(url).map_err(|e| FlockError::Http(format!("invalid URL {url}: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| FlockError::Http(format!("URL has no host: {url}")))?
            .to_ascii_lowercase();

        debug!(url = %parsed, "Fetching");
        self.limiter
            .run(&host, min_interval, || self.transport.get(&parsed))
            .await
    }
}
