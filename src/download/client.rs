//! HTTP fetching of media bytes to disk.
//!
//! This module provides the [`Fetcher`] seam used by the transfer executor
//! and [`HttpFetcher`], its reqwest-backed implementation that streams the
//! response body into a file.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use crate::user_agent;

/// Fetches a remote resource and stores its bytes at a given path.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Downloads `url` into `dest`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns a [`DownloadError`] on any transport, status or IO failure.
    /// `dest` may hold partial data afterwards; callers decide what to do
    /// with it.
    async fn fetch_to(&self, url: &str, dest: &Path) -> Result<u64, DownloadError>;
}

/// HTTP fetcher with streaming support.
///
/// Created once and shared by all transfers to reuse pooled connections.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Creates a fetcher with default timeouts.
    ///
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a fetcher with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::network(url, e)
            }
        })?;

        if response.status() != StatusCode::OK {
            return Err(DownloadError::http_status(url, response.status().as_u16()));
        }

        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self), fields(dest = %dest.display()))]
    async fn fetch_to(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self.send(url).await?;

        let mut file = File::create(dest)
            .await
            .map_err(|e| DownloadError::io(dest, e))?;
        let bytes = stream_to_file(&mut file, response, url, dest).await?;

        debug!(bytes, "response body written");
        Ok(bytes)
    }
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}
