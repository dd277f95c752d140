//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use crate::models::{Entry, Feed, Link, SearchQuery};
use crate::sources::{DownloadError, Source, SourceError};

/// A mock source that serves a predefined feed and in-memory documents.
///
/// Downloads of URLs without a registered document fail with a network error.
#[derive(Debug, Default)]
pub struct MockSource {
    feed: Mutex<Option<Feed>>,
    fail_search: Mutex<Option<String>>,
    documents: Mutex<HashMap<String, Vec<u8>>>,
    requested: Mutex<Vec<String>>,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the feed returned by `search`.
    pub fn set_feed(&self, feed: Feed) {
        let mut guard = self.feed.lock().unwrap();
        *guard = Some(feed);
    }

    /// Make `search` fail with a network error.
    pub fn fail_search(&self, reason: impl Into<String>) {
        let mut guard = self.fail_search.lock().unwrap();
        *guard = Some(reason.into());
    }

    /// Serve `body` for downloads of `url`.
    pub fn add_document(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        let mut guard = self.documents.lock().unwrap();
        guard.insert(url.into(), body.into());
    }

    /// URLs passed to `download`, in call order.
    pub fn requested_downloads(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search(&self, _query: &SearchQuery) -> Result<Feed, SourceError> {
        if let Some(reason) = self.fail_search.lock().unwrap().clone() {
            return Err(SourceError::Network(reason));
        }
        let guard = self.feed.lock().unwrap();
        Ok(guard.clone().unwrap_or_default())
    }

    async fn download(&self, url: &str, path: &Path) -> Result<u64, DownloadError> {
        self.requested.lock().unwrap().push(url.to_string());
        let body = self
            .documents
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| DownloadError::Network(format!("unreachable: {}", url)))?;
        tokio::fs::write(path, &body).await?;
        Ok(body.len() as u64)
    }
}

/// Helper function to create a mock entry with a title and a pdf link.
pub fn make_entry(short_id: &str, title: &str) -> Entry {
    let mut entry = Entry::new(format!("http://arxiv.org/abs/{}", short_id));
    entry.title = Some(title.to_string());
    entry.links = vec![
        Link::new("alternate", format!("http://arxiv.org/abs/{}", short_id)),
        Link::new("related", format!("http://arxiv.org/pdf/{}", short_id)).title("pdf"),
    ];
    entry
}
