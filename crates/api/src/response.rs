//! Shared response envelope types for API handlers.
//!
//! Single resources are returned as bare JSON objects. List endpoints wrap
//! their rows in [`PageResponse`].

use guestbook_core::pagination::{PageInfo, PageRequest};
use serde::Serialize;

/// One page of a listing plus navigation metadata:
/// `{ "data": [...], "total", "page", "per_page", "prev_page", "next_page" }`.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub data: Vec<T>,
    #[serde(flatten)]
    pub page: PageInfo,
}

impl<T: Serialize> PageResponse<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            data,
            page: request.info(total),
        }
    }
}
