//! Rate-limited HTTP fetcher
//!
//! Every outbound request of the process goes through [`Fetcher`], which
//! - sends the configured `User-Agent` header,
//! - applies an explicit per-request timeout,
//! - waits on the shared [`RateLimiter`] before dispatching.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Client, Response};
use url::Url;

use crate::config::Config;
use crate::crawler::limiter::RateLimiter;
use crate::utils::error::FetchError;

/// HTTP client wrapper routing every call through the rate limiter
#[derive(Debug, Clone)]
pub struct Fetcher {
    /// HTTP client with configured user agent and timeout
    client: Client,

    /// Limiter shared with every other fetcher clone
    limiter: Arc<RateLimiter>,
}

impl Fetcher {
    /// Create a fetcher from the run configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let capacity = NonZeroU32::new(config.http.request_limit_per_min)
            .unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::new(capacity, config.rate_window()));
        tracing::debug!(
            capacity = limiter.capacity(),
            window_secs = limiter.window().as_secs(),
            "Rate limiter configured"
        );

        Self::new(&config.http.user_agent, config.request_timeout(), limiter)
    }

    /// Create a fetcher with an explicit limiter
    ///
    /// # Arguments
    ///
    /// * `user_agent` - Value of the `User-Agent` header
    /// * `timeout` - Per-request timeout
    /// * `limiter` - Shared rate limiter
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()?;

        Ok(Self { client, limiter })
    }

    /// The shared rate limiter
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Fetch a URL and return the response body as text
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` for malformed URLs, `FetchError::Timeout`
    /// when the request times out, `FetchError::ServerError` on non-2xx status
    /// and `FetchError::Http` for any other transport failure.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.fetch(url).await?;

        response
            .text()
            .await
            .map_err(|e| Self::classify(url, e))
    }

    /// Fetch a URL with rate limiting
    pub async fn fetch(&self, url: &str) -> Result<Response, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;

        // Wait for rate limiter
        self.limiter.acquire().await;

        tracing::debug!(url = %url, "Fetching URL");
        let started = Instant::now();

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| Self::classify(url, e))?;

        let status = response.status();
        tracing::debug!(
            url = %url,
            status = status.as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Got response"
        );

        if !status.is_success() {
            return Err(FetchError::ServerError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    fn classify(url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(url.to_string())
        } else {
            FetchError::Http(err)
        }
    }
}
