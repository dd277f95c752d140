//! arXiv export API source.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use url::Url;

use crate::config::ApiConfig;
use crate::models::{Feed, SearchQuery};
use crate::sources::{parse_feed, DownloadError, Source, SourceError};
use crate::utils::HttpClient;

/// Base URL for arXiv API
pub const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// Build the full request URL for a query against `base_url`.
///
/// Parameters are form-urlencoded, so `all:quantum dots` becomes `all%3Aquantum+dots`.
pub fn build_query_url(base_url: &str, query: &SearchQuery) -> Result<String, SourceError> {
    let url = Url::parse_with_params(
        base_url,
        &[
            ("search_query", query.search_expression()),
            ("start", query.start.to_string()),
            ("max_results", query.max_results.to_string()),
            ("sortBy", query.sort_by.as_api_str().to_string()),
            ("sortOrder", query.sort_order.as_api_str().to_string()),
        ],
    )?;
    Ok(url.into())
}

/// arXiv research source
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: Arc<HttpClient>,
    base_url: String,
}

impl ArxivSource {
    /// Create a new arXiv source against the public endpoint
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self {
            client: Arc::new(HttpClient::new()?),
            base_url: ARXIV_API_URL.to_string(),
        })
    }

    /// Create from the `[api]` configuration section
    pub fn from_config(config: &ApiConfig) -> Result<Self, SourceError> {
        let client = HttpClient::with_options(&config.user_agent, config.timeout())?;
        Ok(Self::with_client(Arc::new(client), &config.base_url))
    }

    /// Create with a custom HTTP client and endpoint (for testing)
    pub fn with_client(client: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Source for ArxivSource {
    fn id(&self) -> &str {
        "arxiv"
    }

    fn name(&self) -> &str {
        "arXiv"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Feed, SourceError> {
        let url = build_query_url(&self.base_url, query)?;
        tracing::info!(%url, "querying arXiv");

        let bytes = self.client.get_bytes(&url).await?;
        let feed = parse_feed(&bytes);
        tracing::debug!(entries = feed.entries.len(), "feed parsed");

        Ok(feed)
    }

    async fn download(&self, url: &str, path: &Path) -> Result<u64, DownloadError> {
        self.client.download_to(url, path).await
    }
}
