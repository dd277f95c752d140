//! Search query model.

use serde::{Deserialize, Serialize};

/// Default number of results requested per query
pub const DEFAULT_MAX_RESULTS: i64 = 5;

/// Sort order for search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Value of the `sortOrder` query parameter
    pub fn as_api_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }
}

/// Sort field for search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Relevance,
    #[default]
    LastUpdatedDate,
    SubmittedDate,
}

impl SortBy {
    /// Value of the `sortBy` query parameter
    pub fn as_api_str(&self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::LastUpdatedDate => "lastUpdatedDate",
            SortBy::SubmittedDate => "submittedDate",
        }
    }
}

/// Search query parameters
///
/// `max_results` is forwarded to the API as given; validating it is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text search, scoped to all fields
    pub query: String,

    /// Offset of the first result
    pub start: u64,

    /// Maximum number of results to return
    pub max_results: i64,

    /// Sort by field
    pub sort_by: SortBy,

    /// Sort order
    pub sort_order: SortOrder,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            start: 0,
            max_results: DEFAULT_MAX_RESULTS,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set the start offset
    pub fn start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    /// Set maximum results
    pub fn max_results(mut self, max: i64) -> Self {
        self.max_results = max;
        self
    }

    /// The `search_query` parameter value
    pub fn search_expression(&self) -> String {
        format!("all:{}", self.query)
    }
}
