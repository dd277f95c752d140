//! Utility modules supporting the query pipeline.
//!
//! - [`HttpClient`]: shared reqwest client for feed fetches and PDF downloads
//! - [`sanitize_filename`]: strip characters that are unsafe in filenames
//!
//! # Filenames
//!
//! ```rust
//! use arxiv_query::utils::sanitize_filename;
//!
//! assert_eq!(sanitize_filename("spin: a review?.pdf"), "spin a review.pdf");
//! ```

mod http;
mod validate;

pub use http::{HttpClient, DEFAULT_USER_AGENT};
pub use validate::{sanitize_filename, UNSAFE_FILENAME_CHARS};
