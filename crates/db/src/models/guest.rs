//! Guest entity model and DTOs.

use chrono::{NaiveDate, NaiveTime};
use guestbook_core::schedule::ScheduledVisit;
use guestbook_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A guest visit row from the `guests` table.
///
/// `coming_date` serializes as `YYYY-MM-DD`; `coming_time` and `stay_time`
/// serialize as `HH:MM:SS`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Guest {
    pub id: DbId,
    pub guest_type_id: DbId,
    pub inviter_id: DbId,
    pub coming_date: NaiveDate,
    #[serde(with = "hms")]
    pub coming_time: NaiveTime,
    /// Length of the visit, stored as a time of day.
    #[serde(with = "hms")]
    pub stay_time: NaiveTime,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Guest> for ScheduledVisit {
    fn from(guest: &Guest) -> Self {
        ScheduledVisit {
            id: guest.id,
            coming_date: guest.coming_date,
            coming_time: guest.coming_time,
            stay_time: guest.stay_time,
        }
    }
}

/// DTO for creating a new guest.
#[derive(Debug, Clone)]
pub struct CreateGuest {
    pub guest_type_id: DbId,
    pub inviter_id: DbId,
    pub coming_date: NaiveDate,
    pub coming_time: NaiveTime,
    pub stay_time: NaiveTime,
    pub comment: Option<String>,
}

/// DTO for updating an existing guest. All fields are optional; `None` keeps
/// the stored value.
///
/// `comment` is doubly optional so a caller can distinguish "leave as is"
/// (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct UpdateGuest {
    pub guest_type_id: Option<DbId>,
    pub inviter_id: Option<DbId>,
    pub coming_date: Option<NaiveDate>,
    pub coming_time: Option<NaiveTime>,
    pub stay_time: Option<NaiveTime>,
    pub comment: Option<Option<String>>,
}

impl UpdateGuest {
    /// Full replacement: every field is set, including a cleared comment.
    pub fn replace_with(input: CreateGuest) -> Self {
        Self {
            guest_type_id: Some(input.guest_type_id),
            inviter_id: Some(input.inviter_id),
            coming_date: Some(input.coming_date),
            coming_time: Some(input.coming_time),
            stay_time: Some(input.stay_time),
            comment: Some(input.comment),
        }
    }

    /// Apply this update over a stored row, producing the row to be written.
    pub fn merge_onto(&self, existing: &Guest) -> CreateGuest {
        CreateGuest {
            guest_type_id: self.guest_type_id.unwrap_or(existing.guest_type_id),
            inviter_id: self.inviter_id.unwrap_or(existing.inviter_id),
            coming_date: self.coming_date.unwrap_or(existing.coming_date),
            coming_time: self.coming_time.unwrap_or(existing.coming_time),
            stay_time: self.stay_time.unwrap_or(existing.stay_time),
            comment: match &self.comment {
                Some(comment) => comment.clone(),
                None => existing.comment.clone(),
            },
        }
    }
}

/// Optional filters for guest listings. Date bounds are inclusive and apply
/// independently of each other.
#[derive(Debug, Clone, Default)]
pub struct GuestFilter {
    pub inviter_id: Option<DbId>,
    pub guest_type_id: Option<DbId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// `HH:MM:SS` serialization for times, dropping any sub-second part.
mod hms {
    use chrono::NaiveTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M:%S"))
    }
}
