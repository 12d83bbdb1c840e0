//! Guest type entity model.

use guestbook_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A guest category row from the `guest_types` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GuestType {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
