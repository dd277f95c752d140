//! Download task and result models.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::Entry;
use crate::utils::sanitize_filename;

/// Number of title words kept in a generated filename
const TITLE_WORDS: usize = 10;

/// Build the on-disk name for an entry's PDF: `<query>_<title words>_<short id>.pdf`, sanitized.
pub fn download_filename(query: &str, title: &str, short_id: &str) -> String {
    let title_part = title
        .split_whitespace()
        .take(TITLE_WORDS)
        .collect::<Vec<_>>()
        .join(" ");
    sanitize_filename(&format!("{}_{}_{}.pdf", query, title_part, short_id))
}

/// A PDF to fetch for one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadTask {
    /// Direct file URL
    pub url: String,

    /// Sanitized target filename
    pub filename: String,
}

impl DownloadTask {
    /// Create a new download task; the filename is sanitized here
    pub fn new(url: impl Into<String>, filename: &str) -> Self {
        Self {
            url: url.into(),
            filename: sanitize_filename(filename),
        }
    }

    /// Derive the task for an entry, if it carries a pdf link
    pub fn for_entry(query: &str, entry: &Entry) -> Option<Self> {
        let url = entry.pdf_url()?;
        let title = entry.title.as_deref().unwrap_or("N/A");
        Some(Self {
            url: url.to_string(),
            filename: download_filename(query, title, entry.short_id()),
        })
    }
}

/// Result of a download operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadResult {
    /// Path where the file was saved
    pub path: PathBuf,

    /// Number of bytes written
    pub bytes: u64,
}

impl DownloadResult {
    pub fn new(path: impl Into<PathBuf>, bytes: u64) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Link;

    #[test]
    fn test_download_filename() {
        assert_eq!(
            download_filename("electron", "Electron spin", "1234.5678"),
            "electron_Electron spin_1234.5678.pdf"
        );
    }

    #[test]
    fn test_download_filename_keeps_ten_words() {
        let title = "one two  three\nfour five six seven eight nine ten eleven twelve";
        assert_eq!(
            download_filename("q", title, "1"),
            "q_one two three four five six seven eight nine ten_1.pdf"
        );
    }

    #[test]
    fn test_download_filename_sanitized() {
        assert_eq!(
            download_filename("a/b", "What? A \"quoted\" <title>: part|two", "cond-mat/0102536v1"),
            "ab_What A quoted title parttwo_cond-mat0102536v1.pdf"
        );
    }

    #[test]
    fn test_for_entry() {
        let mut entry = Entry::new("http://arxiv.org/abs/1234.5678");
        entry.title = Some("Electron spin".to_string());
        assert!(DownloadTask::for_entry("electron", &entry).is_none());

        entry.links.push(Link::new("related", "https://example.org/x.pdf").title("pdf"));
        let task = DownloadTask::for_entry("electron", &entry).unwrap();
        assert_eq!(task.url, "https://example.org/x.pdf");
        assert_eq!(task.filename, "electron_Electron spin_1234.5678.pdf");
    }

    #[test]
    fn test_new_sanitizes() {
        let task = DownloadTask::new("http://x", "a:b*c.pdf");
        assert_eq!(task.filename, "abc.pdf");
    }
}
