//! HTTP client wrapper shared by the index and download stages.
//!
//! This module provides the `HttpClient` struct which performs GET requests
//! with a fixed header profile, per-request timeouts, and streaming writes
//! of asset bodies to disk.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};

use super::constants::CONNECT_TIMEOUT_SECS;
use super::error::FetchError;
use crate::user_agent;

/// HTTP client for index pages and asset thumbnails.
///
/// Create one per run and share it between every index task and download
/// worker; clones share the same connection pool.
///
/// # Example
///
/// ```no_run
/// use istock_miner::fetch::HttpClient;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new()?;
/// let page = client
///     .fetch("https://www.istockphoto.com/search/2/image?phrase=dog&page=1", None)
///     .await?;
/// println!("HTTP {} ({} bytes)", page.status, page.body.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

/// Response of a completed request, regardless of status.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code.
    pub status: u16,
    /// Decoded response body.
    pub body: String,
}

impl FetchedPage {
    /// Returns true for a 200 OK response.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK.as_u16()
    }
}

impl HttpClient {
    /// Creates a client with the default connect timeout and browser User-Agent.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the TLS backend or the system
    /// proxy configuration cannot be initialised.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_options(CONNECT_TIMEOUT_SECS, &user_agent::default_user_agent())
    }

    /// Creates a client with an explicit connect timeout and User-Agent.
    ///
    /// Proxy settings are read from the process environment by reqwest.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the client cannot be built.
    #[instrument(level = "debug")]
    pub fn with_options(connect_timeout_secs: u64, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .gzip(true)
            .user_agent(user_agent)
            .build()
            .map_err(|source| FetchError::ClientBuild { source })?;
        debug!("init workers session");
        Ok(Self { client })
    }

    /// Performs a GET request and returns status and body.
    ///
    /// A non-200 status is not an error here; callers decide. Only
    /// transport-level failures are returned as errors.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] or [`FetchError::Timeout`] when the
    /// request or body read fails.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<FetchedPage, FetchError> {
        let response = self.send(url, timeout).await?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::network(url, e))?;
        debug!(status, bytes = body.len(), "fetched");
        Ok(FetchedPage { status, body })
    }

    /// Performs a GET request and returns the body of a 200 OK response.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UnexpectedStatus`] for any status other than 200,
    /// plus the transport errors of [`fetch`](Self::fetch).
    pub async fn fetch_page(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<String, FetchError> {
        let page = self.fetch(url, timeout).await?;
        if !page.is_ok() {
            return Err(FetchError::unexpected_status(url, page.status));
        }
        Ok(page.body)
    }

    /// Downloads an asset and writes its body verbatim to `path`.
    ///
    /// Any existing file at `path` is replaced. Nothing is written unless the
    /// server answers 200; a body stream that breaks midway removes the
    /// partially written file.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UnexpectedStatus`] for non-200 responses,
    /// [`FetchError::Io`] when the file cannot be written, and the transport
    /// errors of [`fetch`](Self::fetch).
    #[must_use = "download result contains the number of bytes written"]
    #[instrument(skip(self), fields(url = %url, path = %path.display()))]
    pub async fn download_to_path(
        &self,
        url: &str,
        path: &Path,
        timeout: Option<Duration>,
    ) -> Result<u64, FetchError> {
        let response = self.send(url, timeout).await?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::unexpected_status(url, response.status().as_u16()));
        }

        let mut file = File::create(path)
            .await
            .map_err(|e| FetchError::io(path, e))?;

        let stream_result = stream_to_file(&mut file, response, url, path).await;
        if stream_result.is_err() {
            debug!("cleaning up partial file after error");
            let _ = tokio::fs::remove_file(path).await;
        }
        stream_result
    }

    async fn send(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, FetchError> {
        let parsed = url::Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;
        let mut request = self.client.get(parsed);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        request.send().await.map_err(|e| FetchError::network(url, e))
    }
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, FetchError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| FetchError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| FetchError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| FetchError::io(file_path, e))?;

    Ok(bytes_written)
}
