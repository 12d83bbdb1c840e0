//! Domain types and rules for the guestbook service.
//!
//! This crate has no internal dependencies and does no I/O, so the scheduling
//! rules can be exercised directly in unit tests and reused by the `db` and
//! `api` crates.

pub mod error;
pub mod pagination;
pub mod schedule;
pub mod types;
pub mod validation;
