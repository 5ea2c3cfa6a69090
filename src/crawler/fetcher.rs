//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building HTTP clients with proper user agent strings
//! - Retry with linear backoff for transient failures
//! - Error classification
//! - Charset-aware body decoding

use crate::config::{Config, UserAgentConfig};
use crate::crawler::charset::decode_body;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// A successfully fetched and decoded page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: String,
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Decoded body
    pub body: String,
    /// Name of the encoding used to decode the body
    pub encoding: &'static str,
}

/// Retrieves documents by URL
///
/// The harvester only talks to the network through this trait, so tests can
/// substitute an in-memory implementation.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches `url`, retrying as the implementation sees fit
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Bounded retry with linear backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    pub base_delay: Duration,
    pub increment: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            attempts: config.crawler.retry_count,
            base_delay: Duration::from_millis(config.crawler.retry_base_delay_ms),
            increment: Duration::from_millis(config.crawler.retry_increment_ms),
        }
    }

    /// Pause after the failed attempt with zero-based index `attempt`
    ///
    /// The first retry already waits `base + increment`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay + self.increment * attempt.saturating_add(1)
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout_secs` - Per-request timeout
///
/// # Example
///
/// ```no_run
/// use listing_harvester::config::UserAgentConfig;
/// use listing_harvester::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "ListingHarvester".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, 15).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Outcome of a single request
#[derive(Debug)]
enum Attempt {
    Done(FetchedPage),
    /// Worth retrying: network errors, timeouts, 5xx, 408, 429
    Transient(String),
    /// Retrying cannot help: other 4xx, malformed URLs
    Final(String),
}

/// `Fetch` over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    /// Builds a fetcher from the run configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, config.crawler.request_timeout_secs)?;
        Ok(Self::with_client(client, RetryPolicy::from_config(config)))
    }

    pub fn with_client(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    async fn attempt(&self, url: &str) -> Attempt {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return classify_error(&e),
        };

        let status = response.status();
        if !status.is_success() {
            return classify_status(status);
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match response.bytes().await {
            Ok(bytes) => {
                let (body, encoding) = decode_body(&bytes, content_type.as_deref());
                Attempt::Done(FetchedPage {
                    url: url.to_string(),
                    final_url,
                    status_code: status.as_u16(),
                    body,
                    encoding,
                })
            }
            Err(e) => Attempt::Transient(format!("Failed to read body: {}", e)),
        }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let attempts = self.retry.attempts.max(1);
        let mut last_reason = String::new();

        for attempt in 0..attempts {
            match self.attempt(url).await {
                Attempt::Done(page) => {
                    tracing::debug!(
                        "Fetched {} ({}, {} bytes, {})",
                        url,
                        page.status_code,
                        page.body.len(),
                        page.encoding
                    );
                    return Ok(page);
                }
                Attempt::Final(reason) => {
                    return Err(FetchError {
                        url: url.to_string(),
                        attempts: attempt + 1,
                        reason,
                    });
                }
                Attempt::Transient(reason) => {
                    if attempt + 1 < attempts {
                        let delay = self.retry.delay_after(attempt);
                        tracing::debug!(
                            "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                            attempt + 1,
                            attempts,
                            url,
                            reason,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_reason = reason;
                }
            }
        }

        Err(FetchError {
            url: url.to_string(),
            attempts,
            reason: last_reason,
        })
    }
}

fn classify_status(status: StatusCode) -> Attempt {
    let reason = format!("HTTP {}", status.as_u16());
    if is_transient_status(status) {
        Attempt::Transient(reason)
    } else {
        Attempt::Final(reason)
    }
}

/// 5xx, 408 and 429 may succeed later; any other error status will not
pub fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

fn classify_error(e: &reqwest::Error) -> Attempt {
    if e.is_builder() {
        Attempt::Final(format!("Invalid request: {}", e))
    } else if e.is_timeout() {
        Attempt::Transient("Request timeout".to_string())
    } else if e.is_connect() {
        Attempt::Transient(format!("Connection failed: {}", e))
    } else {
        Attempt::Transient(e.to_string())
    }
}
