//! HTTP fetcher implementation
//!
//! This module performs the crawl's network requests:
//! - Building the HTTP client with a proper user agent string
//! - One GET per call, no retries
//! - Streaming the body into an atomic store write
//! - Error classification

use crate::config::{Config, UserAgentConfig};
use crate::store::{RecordStore, StoreError};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Why a single fetch failed
#[derive(Debug, Error)]
pub enum FetchCause {
    #[error("request timeout")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("no usable record id in URL")]
    InvalidId,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<reqwest::Error> for FetchCause {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// A failed fetch of one URL
#[derive(Debug, Error)]
#[error("fetch of {url} failed: {cause}")]
pub struct FetchError {
    pub url: String,
    #[source]
    pub cause: FetchCause,
}

impl FetchError {
    pub fn new(url: impl Into<String>, cause: impl Into<FetchCause>) -> Self {
        Self {
            url: url.into(),
            cause: cause.into(),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Overall per-request timeout
///
/// # Example
///
/// ```no_run
/// use lounge_atlas::config::UserAgentConfig;
/// use lounge_atlas::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues single GET requests and streams bodies into a record store
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from the crawler and user agent settings
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.crawler.request_timeout_secs);
        Ok(Self::new(build_http_client(&config.user_agent, timeout)?))
    }

    /// Fetches `url` and stores the body as record `id`
    ///
    /// Exactly one request is made. The record becomes visible only after the
    /// whole body has been received; on any failure nothing is left behind and
    /// a previously stored version of the record is untouched.
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - Number of body bytes stored
    /// * `Err(FetchError)` - Transport failure, non-2xx status, or store failure
    pub async fn fetch_into(
        &self,
        url: &str,
        id: &str,
        store: &dyn RecordStore,
    ) -> Result<u64, FetchError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::new(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(url, FetchCause::Status(status.as_u16())));
        }

        let mut writer = store.begin_write(id).map_err(|e| FetchError::new(url, e))?;
        let mut written = 0u64;

        while let Some(chunk) = response.chunk().await.map_err(|e| FetchError::new(url, e))? {
            writer
                .write_chunk(&chunk)
                .map_err(|e| FetchError::new(url, e))?;
            written += chunk.len() as u64;
        }

        writer.commit().map_err(|e| FetchError::new(url, e))?;

        tracing::debug!("Stored {} bytes from {} as {}", written, url, id);
        Ok(written)
    }
}
