//! Feed model: feed-level metadata plus the ordered entries of one response.

use serde::{Deserialize, Serialize};

/// Marker preceding the short identifier in an entry id
const ABSTRACT_PATH_MARKER: &str = "/abs/";

/// Relation of the abstract page link
pub const REL_ALTERNATE: &str = "alternate";

/// Declared title of the full-text link
pub const PDF_LINK_TITLE: &str = "pdf";

/// Feed-level metadata. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMetadata {
    pub title: Option<String>,
    pub updated: Option<String>,
    pub total_results: Option<String>,
    pub items_per_page: Option<String>,
    pub start_index: Option<String>,
}

/// One parsed response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub metadata: FeedMetadata,

    /// Entries in the order the source returned them
    pub entries: Vec<Entry>,
}

impl Feed {
    pub fn new(metadata: FeedMetadata, entries: Vec<Entry>) -> Self {
        Self { metadata, entries }
    }
}

/// An entry author
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: Option<String>,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// An entry link
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Relation; links without one are alternates
    pub rel: String,

    /// Declared title (`pdf` marks the full-text link)
    pub title: Option<String>,

    pub href: Option<String>,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            title: None,
            href: Some(href.into()),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn is_alternate(&self) -> bool {
        self.rel == REL_ALTERNATE
    }

    pub fn is_pdf(&self) -> bool {
        self.title.as_deref() == Some(PDF_LINK_TITLE)
    }
}

/// One paper's metadata record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub title: Option<String>,
    pub authors: Vec<Author>,
    pub links: Vec<Link>,
    pub journal_ref: Option<String>,
    pub comment: Option<String>,
    pub doi: Option<String>,
    pub primary_category: Option<String>,

    /// Category terms, in document order
    pub categories: Vec<String>,
    pub summary: Option<String>,
}

impl Entry {
    /// Create an entry with only its id set
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Substring of the id after the last `/abs/`, or the whole id when it has none
    pub fn short_id(&self) -> &str {
        self.id
            .rsplit(ABSTRACT_PATH_MARKER)
            .next()
            .unwrap_or(&self.id)
    }

    /// Href of the full-text link.
    ///
    /// Every pdf-titled link overwrites the previous one, so the last one wins.
    /// Alternate links are never considered, even when titled `pdf`.
    pub fn pdf_url(&self) -> Option<&str> {
        let mut pdf_url = None;
        for link in &self.links {
            if link.is_alternate() {
                continue;
            }
            if link.is_pdf() {
                pdf_url = link.href.as_deref();
            }
        }
        pdf_url
    }
}
