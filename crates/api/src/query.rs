//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Default page size for page-numbered listings.
pub const DEFAULT_PAGE_LIMIT: i64 = 100;

/// Largest page size a client may request.
pub const MAX_PAGE_LIMIT: i64 = 500;

/// Page-numbered pagination (`?page=&limit=`), 1-based.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    /// The requested page, at least 1.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// The requested page size, clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Parse a comma-separated id list such as `?projects=1,2,3`. Blank and
/// non-numeric entries are skipped.
pub fn parse_id_list(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect()
}
