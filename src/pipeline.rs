//! The query pipeline: search, report every entry, download linked PDFs.
//!
//! Everything runs sequentially. A failed search aborts the run before anything is printed;
//! a failed download is reported and the run moves on to the next entry.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::models::{DownloadResult, DownloadTask, SearchQuery};
use crate::sources::{DownloadError, Source, SourceError};
use crate::ui::{OutputFormat, Reporter};

/// Pipeline settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Directory PDFs are written into
    pub download_dir: PathBuf,

    /// Whether linked PDFs are downloaded
    pub download: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("pdfs"),
            download: true,
        }
    }
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            download_dir: config.downloads.directory.clone(),
            download: config.downloads.enabled,
        }
    }
}

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub entries: usize,
    pub downloads_attempted: usize,
    pub downloads_succeeded: usize,
    pub downloads_failed: usize,
}

/// Errors that end a run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The feed could not be fetched
    #[error("{0}")]
    Fetch(#[from] SourceError),

    /// The report could not be written
    #[error("Failed to write report: {0}")]
    Output(#[from] io::Error),
}

/// Run one query end to end
pub async fn run<S, O, E>(
    source: &S,
    query: &SearchQuery,
    options: &PipelineOptions,
    reporter: &mut Reporter<O, E>,
) -> Result<RunSummary, PipelineError>
where
    S: Source + ?Sized,
    O: Write,
    E: Write,
{
    let feed = source.search(query).await?;
    tracing::debug!(source = source.id(), entries = feed.entries.len(), "search finished");

    match reporter.format() {
        OutputFormat::Plain => reporter.feed_header(&feed.metadata)?,
        OutputFormat::Json => reporter.json(&feed)?,
    }

    let mut summary = RunSummary::default();
    for entry in &feed.entries {
        if reporter.format() == OutputFormat::Plain {
            reporter.entry(entry)?;
        }
        summary.entries += 1;

        if !options.download {
            continue;
        }
        let Some(task) = DownloadTask::for_entry(&query.query, entry) else {
            continue;
        };

        summary.downloads_attempted += 1;
        match download(source, &task, &options.download_dir, reporter).await? {
            Some(_) => summary.downloads_succeeded += 1,
            None => summary.downloads_failed += 1,
        }
    }

    Ok(summary)
}

/// Fetch one document into `dir`.
///
/// Download failures are reported and yield `Ok(None)`; only a broken report stream is an
/// error.
pub async fn download<S, O, E>(
    source: &S,
    task: &DownloadTask,
    dir: &Path,
    reporter: &mut Reporter<O, E>,
) -> io::Result<Option<DownloadResult>>
where
    S: Source + ?Sized,
    O: Write,
    E: Write,
{
    let path = dir.join(&task.filename);

    let result = match tokio::fs::create_dir_all(dir).await {
        Ok(()) => {
            reporter.download_started(&task.filename)?;
            source.download(&task.url, &path).await
        }
        Err(e) => Err(DownloadError::Io(e)),
    };

    match result {
        Ok(bytes) => {
            tracing::debug!(url = %task.url, bytes, "download complete");
            reporter.download_finished(&path)?;
            Ok(Some(DownloadResult::new(path, bytes)))
        }
        Err(e) => {
            tracing::debug!(url = %task.url, error = %e, "download failed");
            reporter.download_failed(&e)?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entry, Feed, FeedMetadata};
    use crate::sources::mock::make_entry;
    use crate::sources::MockSource;

    fn reporter() -> Reporter<Vec<u8>, Vec<u8>> {
        Reporter::new(Vec::new(), Vec::new(), OutputFormat::Plain)
    }

    fn output(reporter: Reporter<Vec<u8>, Vec<u8>>) -> (String, String) {
        let (out, err) = reporter.into_inner();
        (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    fn options(dir: &Path) -> PipelineOptions {
        PipelineOptions {
            download_dir: dir.join("pdfs"),
            download: true,
        }
    }

    #[tokio::test]
    async fn test_run_empty_feed() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockSource::new();
        source.set_feed(Feed::new(
            FeedMetadata {
                title: Some("ArXiv Query: nothing".to_string()),
                total_results: Some("0".to_string()),
                ..Default::default()
            },
            Vec::new(),
        ));

        let mut reporter = reporter();
        let summary = run(&source, &SearchQuery::new("nothing"), &options(dir.path()), &mut reporter)
            .await
            .unwrap();

        assert_eq!(summary, RunSummary::default());
        assert!(source.requested_downloads().is_empty());
        assert!(!dir.path().join("pdfs").exists());

        let (out, err) = output(reporter);
        assert!(out.starts_with("Feed title: ArXiv Query: nothing\n"));
        assert!(out.contains("totalResults for this query: 0\n"));
        assert!(!out.contains("e-print metadata"));
        assert!(err.is_empty());
    }

    #[tokio::test]
    async fn test_run_downloads_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockSource::new();
        source.set_feed(Feed::new(
            FeedMetadata::default(),
            vec![make_entry("1234.5678", "Electron spin")],
        ));
        source.add_document("http://arxiv.org/pdf/1234.5678", "%PDF-1.4");

        let mut reporter = reporter();
        let summary = run(&source, &SearchQuery::new("electron"), &options(dir.path()), &mut reporter)
            .await
            .unwrap();

        assert_eq!(summary.entries, 1);
        assert_eq!(summary.downloads_succeeded, 1);

        let path = dir.path().join("pdfs").join("electron_Electron spin_1234.5678.pdf");
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");

        let (out, _) = output(reporter);
        assert!(out.contains("Downloading PDF: electron_Electron spin_1234.5678.pdf\n"));
        assert!(out.contains(&format!("PDF downloaded successfully: {}\n", path.display())));
    }

    #[tokio::test]
    async fn test_run_continues_after_failed_download() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockSource::new();
        source.set_feed(Feed::new(
            FeedMetadata::default(),
            vec![
                make_entry("1111.0001", "Unreachable paper"),
                make_entry("2222.0002", "Reachable paper"),
            ],
        ));
        source.add_document("http://arxiv.org/pdf/2222.0002", "pdf");

        let mut reporter = reporter();
        let summary = run(&source, &SearchQuery::new("q"), &options(dir.path()), &mut reporter)
            .await
            .unwrap();

        assert_eq!(
            summary,
            RunSummary {
                entries: 2,
                downloads_attempted: 2,
                downloads_succeeded: 1,
                downloads_failed: 1,
            }
        );
        assert_eq!(
            source.requested_downloads(),
            vec!["http://arxiv.org/pdf/1111.0001", "http://arxiv.org/pdf/2222.0002"]
        );

        let (out, err) = output(reporter);
        assert!(out.contains("arxiv-id: 1111.0001\n"));
        assert!(out.contains("Title: Unreachable paper\n"));
        assert!(out.contains("Abstract: N/A\n"));
        assert!(out.contains("arxiv-id: 2222.0002\n"));
        assert!(err.starts_with("Error downloading PDF: "));
        assert!(dir.path().join("pdfs").join("q_Reachable paper_2222.0002.pdf").exists());
    }

    #[tokio::test]
    async fn test_run_skips_entries_without_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockSource::new();
        let mut entry = Entry::new("http://arxiv.org/abs/3333.0003");
        entry.title = Some("No file".to_string());
        source.set_feed(Feed::new(FeedMetadata::default(), vec![entry]));

        let mut reporter = reporter();
        let summary = run(&source, &SearchQuery::new("q"), &options(dir.path()), &mut reporter)
            .await
            .unwrap();

        assert_eq!(summary.entries, 1);
        assert_eq!(summary.downloads_attempted, 0);
        assert!(source.requested_downloads().is_empty());
    }

    #[tokio::test]
    async fn test_run_without_downloads() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockSource::new();
        source.set_feed(Feed::new(
            FeedMetadata::default(),
            vec![make_entry("1234.5678", "Electron spin")],
        ));

        let options = PipelineOptions {
            download: false,
            ..options(dir.path())
        };
        let mut reporter = reporter();
        let summary = run(&source, &SearchQuery::new("electron"), &options, &mut reporter)
            .await
            .unwrap();

        assert_eq!(summary.entries, 1);
        assert_eq!(summary.downloads_attempted, 0);
        assert!(source.requested_downloads().is_empty());
    }

    #[tokio::test]
    async fn test_run_search_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockSource::new();
        source.fail_search("connection refused");

        let mut reporter = reporter();
        let err = run(&source, &SearchQuery::new("q"), &options(dir.path()), &mut reporter)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Fetch(SourceError::Network(_))));
        let (out, _) = output(reporter);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_download_unwritable_dir() {
        let dir = tempfile::tempdir().unwrap();
        // a regular file where the directory should be
        let blocker = dir.path().join("pdfs");
        std::fs::write(&blocker, "").unwrap();

        let source = MockSource::new();
        source.add_document("http://x/a.pdf", "pdf");
        let task = DownloadTask::new("http://x/a.pdf", "a.pdf");

        let mut reporter = reporter();
        let result = download(&source, &task, &blocker, &mut reporter).await.unwrap();

        assert!(result.is_none());
        assert!(source.requested_downloads().is_empty());
        let (_, err) = output(reporter);
        assert!(err.starts_with("Error saving PDF: "));
    }
}
