//! Result reporting.
//!
//! [`Reporter`] writes the human-readable report to one stream and diagnostics to another.
//! Both are generic writers so the exact output can be captured in tests.

use serde::{Deserialize, Serialize};
use std::io::{self, Stderr, Stdout, Write};
use std::path::Path;

use crate::models::{Entry, Feed, FeedMetadata};
use crate::sources::DownloadError;

/// Placeholder printed for any absent field
pub const NOT_AVAILABLE: &str = "N/A";

const NO_AUTHORS: &str = "No author information available";
const NO_JOURNAL_REF: &str = "No journal ref found";
const NO_COMMENT: &str = "No comment found";
const NO_CATEGORIES: &str = "No category information available";

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Line-oriented text report
    #[default]
    Plain,
    /// The parsed feed as pretty-printed JSON
    Json,
}

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_AVAILABLE)
}

/// Writes the report and diagnostics
#[derive(Debug)]
pub struct Reporter<O: Write, E: Write> {
    out: O,
    err: E,
    format: OutputFormat,
}

impl Reporter<Stdout, Stderr> {
    /// Report on stdout, diagnostics on stderr
    pub fn stdio(format: OutputFormat) -> Self {
        Self::new(io::stdout(), io::stderr(), format)
    }
}

impl<O: Write, E: Write> Reporter<O, E> {
    pub fn new(out: O, err: E, format: OutputFormat) -> Self {
        Self { out, err, format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Give back the underlying writers
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    /// Print the whole feed in JSON form
    pub fn json(&mut self, feed: &Feed) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, feed)?;
        writeln!(self.out)
    }

    /// Print the feed-level header
    pub fn feed_header(&mut self, meta: &FeedMetadata) -> io::Result<()> {
        let out = &mut self.out;
        writeln!(out, "Feed title: {}", or_na(meta.title.as_deref()))?;
        writeln!(out, "Feed last updated: {}", or_na(meta.updated.as_deref()))?;
        writeln!(
            out,
            "totalResults for this query: {}",
            or_na(meta.total_results.as_deref())
        )?;
        writeln!(
            out,
            "itemsPerPage for this query: {}",
            or_na(meta.items_per_page.as_deref())
        )?;
        writeln!(
            out,
            "startIndex for this query: {}",
            or_na(meta.start_index.as_deref())
        )
    }

    /// Print one entry section
    pub fn entry(&mut self, entry: &Entry) -> io::Result<()> {
        let out = &mut self.out;
        writeln!(out, "\ne-print metadata")?;
        writeln!(out, "arxiv-id: {}", entry.short_id())?;
        writeln!(out, "Published: {}", or_na(entry.published.as_deref()))?;
        writeln!(out, "Last Updated: {}", or_na(entry.updated.as_deref()))?;
        writeln!(out, "Title: {}", or_na(entry.title.as_deref()))?;

        match entry.authors.last() {
            Some(last) => {
                let names = entry
                    .authors
                    .iter()
                    .map(|author| or_na(author.name.as_deref()))
                    .collect::<Vec<_>>()
                    .join(", ");
                writeln!(out, "Authors: {}", names)?;
                writeln!(out, "Last Author: {}", or_na(last.name.as_deref()))?;
            }
            None => writeln!(out, "{}", NO_AUTHORS)?,
        }

        for link in &entry.links {
            if link.is_alternate() {
                writeln!(out, "abs page link: {}", or_na(link.href.as_deref()))?;
            } else if link.is_pdf() {
                writeln!(out, "pdf link: {}", or_na(link.href.as_deref()))?;
            }
        }

        writeln!(
            out,
            "Journal reference: {}",
            entry.journal_ref.as_deref().unwrap_or(NO_JOURNAL_REF)
        )?;
        writeln!(
            out,
            "Comments: {}",
            entry.comment.as_deref().unwrap_or(NO_COMMENT)
        )?;

        match entry.categories.first() {
            Some(primary) => {
                writeln!(out, "Primary Category: {}", primary)?;
                writeln!(out, "All Categories: {}", entry.categories.join(", "))?;
            }
            None => writeln!(out, "{}", NO_CATEGORIES)?,
        }

        writeln!(out, "Abstract: {}", or_na(entry.summary.as_deref()))
    }

    /// Progress lines go to the report stream, except in JSON mode where they would
    /// corrupt the document.
    fn progress(&mut self) -> &mut dyn Write {
        match self.format {
            OutputFormat::Plain => &mut self.out,
            OutputFormat::Json => &mut self.err,
        }
    }

    pub fn download_started(&mut self, filename: &str) -> io::Result<()> {
        writeln!(self.progress(), "Downloading PDF: {}", filename)
    }

    pub fn download_finished(&mut self, path: &Path) -> io::Result<()> {
        writeln!(
            self.progress(),
            "PDF downloaded successfully: {}",
            path.display()
        )
    }

    pub fn download_failed(&mut self, error: &DownloadError) -> io::Result<()> {
        match error {
            DownloadError::Network(_) => writeln!(self.err, "Error downloading PDF: {}", error),
            DownloadError::Io(_) => writeln!(self.err, "Error saving PDF: {}", error),
        }
    }
}
