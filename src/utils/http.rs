//! HTTP client utilities.

use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::sources::{DownloadError, SourceError};

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings (no request timeout)
    pub fn new() -> Result<Self, SourceError> {
        Self::with_options(DEFAULT_USER_AGENT, None)
    }

    /// Create a new HTTP client with a custom user agent and optional overall timeout
    pub fn with_options(user_agent: &str, timeout: Option<Duration>) -> Result<Self, SourceError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SourceError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// GET a URL and return the whole body. Non-2xx statuses are errors.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        tracing::debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .header("Accept", "application/atom+xml")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Api(format!("HTTP Error {}", status)));
        }

        let bytes = response.bytes().await?;
        tracing::debug!(url, bytes = bytes.len(), "response received");
        Ok(bytes.to_vec())
    }

    /// Stream a URL into `path`, returning the number of bytes written.
    ///
    /// The file is only created once the server has answered with a success status.
    pub async fn download_to(&self, url: &str, path: &Path) -> Result<u64, DownloadError> {
        tracing::debug!(url, path = %path.display(), "downloading");
        let mut response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?;

        let mut file = tokio::fs::File::create(path).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}
