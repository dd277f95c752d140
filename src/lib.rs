//! # arxiv-query
//!
//! Query the arXiv metadata feed, print each paper's details and download linked PDFs.
//!
//! ## Architecture
//!
//! - [`models`]: Query, feed, entry and download data structures
//! - [`sources`]: The [`Source`] trait, the arXiv implementation and the feed parser
//! - [`pipeline`]: Runs one query end to end
//! - [`ui`]: The text/JSON report
//! - [`utils`]: HTTP client and filename sanitization
//! - [`config`]: Configuration management

pub mod config;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use models::{Entry, Feed, SearchQuery};
pub use sources::{ArxivSource, Source};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
