//! Shared query parameter types for API handlers.

use chrono::NaiveDate;
use guestbook_core::pagination::PageRequest;
use guestbook_core::types::DbId;
use guestbook_db::models::guest::GuestFilter;
use serde::Deserialize;

/// Page-number pagination parameters (`?page=&per_page=`).
///
/// Values are clamped by [`PageRequest::new`].
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageParams {
    pub fn to_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }
}

/// Query parameters for `GET /guests`.
///
/// Pagination fields are repeated rather than `#[serde(flatten)]`ed from
/// [`PageParams`]: flattened query fields arrive as strings and fail to parse
/// as numbers.
#[derive(Debug, Default, Deserialize)]
pub struct GuestListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub inviter_id: Option<DbId>,
    pub guest_type_id: Option<DbId>,
    /// Inclusive lower bound on `coming_date`.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on `coming_date`.
    pub end_date: Option<NaiveDate>,
}

impl GuestListParams {
    pub fn to_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }

    pub fn to_filter(&self) -> GuestFilter {
        GuestFilter {
            inviter_id: self.inviter_id,
            guest_type_id: self.guest_type_id,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}
