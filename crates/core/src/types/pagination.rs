//! Pagination metadata and list query parameters.

use serde::{Deserialize, Serialize};

/// Pagination metadata returned alongside paged collections.
///
/// The backend reports the page size as `limit` and the total as `total`;
/// the longer spellings are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page (1-indexed).
    pub page: u32,
    /// Records per page.
    #[serde(alias = "limit")]
    pub page_size: u32,
    /// Total records matching the query.
    #[serde(alias = "total")]
    pub total_count: u64,
    /// Total number of pages.
    pub total_pages: u32,
}

impl Pagination {
    /// Whether a page after the current one exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether a page before the current one exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Search and paging parameters for the contact response list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactQuery {
    /// Page to fetch (1-indexed).
    pub page: Option<u32>,
    /// Records per page.
    pub limit: Option<u32>,
    /// Free-text search over name, email, company and message.
    pub search: Option<String>,
}

impl ContactQuery {
    /// Query for a specific page with the given size.
    #[must_use]
    pub const fn page(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            search: None,
        }
    }

    /// Add a search term. Blank terms are dropped.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = (!search.trim().is_empty()).then(|| search.trim().to_string());
        self
    }

    /// Render as query-string pairs, omitting unset parameters.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}
