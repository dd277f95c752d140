//! Feed sources.
//!
//! The [`Source`] trait is the seam between the pipeline and the network: a source turns a
//! [`SearchQuery`] into a parsed [`Feed`] and knows how to fetch the documents an entry links
//! to. [`ArxivSource`] talks to the arXiv export API; [`MockSource`] serves canned feeds for
//! tests.

mod arxiv;
mod atom;
pub mod mock;

pub use arxiv::{build_query_url, ArxivSource, ARXIV_API_URL};
pub use atom::parse_feed;
pub use mock::MockSource;

use async_trait::async_trait;
use std::path::Path;

use crate::models::{Feed, SearchQuery};

/// The Source trait defines the interface for feed sources.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Run the query and return the parsed feed
    async fn search(&self, query: &SearchQuery) -> Result<Feed, SourceError>;

    /// Fetch `url` into `path`, returning the number of bytes written
    async fn download(&self, url: &str, path: &Path) -> Result<u64, DownloadError>;
}

/// Errors that can occur when fetching a feed
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Non-success status from the API
    #[error("API error: {0}")]
    Api(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<url::ParseError> for SourceError {
    fn from(err: url::ParseError) -> Self {
        SourceError::InvalidRequest(format!("URL: {}", err))
    }
}

/// Errors from a single document download
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The document could not be fetched
    #[error("{0}")]
    Network(String),

    /// The document could not be written locally
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for DownloadError {
    fn from(err: reqwest::Error) -> Self {
        DownloadError::Network(err.to_string())
    }
}
