//! Core data models for arXiv queries, feeds and downloads.

mod download;
mod feed;
mod query;

pub use download::{download_filename, DownloadResult, DownloadTask};
pub use feed::{Author, Entry, Feed, FeedMetadata, Link, PDF_LINK_TITLE, REL_ALTERNATE};
pub use query::{SearchQuery, SortBy, SortOrder, DEFAULT_MAX_RESULTS};
