//! Page-number pagination (`?page=&per_page=`).
//!
//! Pages are 1-based. Out-of-range inputs are clamped rather than rejected so
//! that list endpoints never fail on pagination parameters alone.

use serde::Serialize;

/// Page size used when the client does not send `per_page`.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Upper bound for `per_page`.
pub const MAX_PER_PAGE: i64 = 100;

/// A clamped page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Clamp user-provided values: `page >= 1`, `1 <= per_page <= MAX_PER_PAGE`.
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    /// SQL `LIMIT`.
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// SQL `OFFSET`.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Navigation metadata for a result set of `total` rows.
    pub fn info(&self, total: i64) -> PageInfo {
        let has_next = self.page.saturating_mul(self.per_page) < total;
        PageInfo {
            total,
            page: self.page,
            per_page: self.per_page,
            prev_page: (self.page > 1).then(|| self.page - 1),
            next_page: has_next.then(|| self.page + 1),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Navigation metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub prev_page: Option<i64>,
    pub next_page: Option<i64>,
}
