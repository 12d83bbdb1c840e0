//! Repository for the `guests` table.
//!
//! Writes go through [`GuestRepo::create`] and [`GuestRepo::update`], which
//! run the schedule validator and the write inside one transaction. Each
//! transaction holds a Postgres advisory lock for every date it touches, so
//! two writers on the same date are serialized and the overlap check always
//! sees the rows it must not overlap.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use guestbook_core::error::CoreError;
use guestbook_core::pagination::PageRequest;
use guestbook_core::schedule::{self, ScheduleCandidate, ScheduledVisit};
use guestbook_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::guest::{CreateGuest, Guest, GuestFilter, UpdateGuest};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, guest_type_id, inviter_id, coming_date, coming_time, stay_time, \
                        comment, created_at, updated_at";

/// First key of the two-key advisory lock taken per scheduled date.
pub const SCHEDULE_LOCK_NAMESPACE: i32 = 0x4753_4348;

/// Filter clause shared by `list` and `count`. Binds `$1..$4`.
const FILTER: &str = "($1::BIGINT IS NULL OR inviter_id = $1)
               AND ($2::BIGINT IS NULL OR guest_type_id = $2)
               AND ($3::DATE IS NULL OR coming_date >= $3)
               AND ($4::DATE IS NULL OR coming_date <= $4)";

/// Failure of a validated guest write.
#[derive(Debug, thiserror::Error)]
pub enum GuestWriteError {
    /// Rejected by a domain rule: bad fields, missing references, or an
    /// overlapping visit.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Provides validated writes and queries for guests.
pub struct GuestRepo;

impl GuestRepo {
    /// Validate and insert a new guest.
    ///
    /// `now` is the caller's local wall-clock time, used for the
    /// "not in the past" rules.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGuest,
        now: NaiveDateTime,
    ) -> Result<Guest, GuestWriteError> {
        let mut tx = pool.begin().await?;

        ensure_references(&mut tx, input.guest_type_id, input.inviter_id).await?;
        lock_dates(&mut tx, &[input.coming_date]).await?;

        let candidate = ScheduleCandidate {
            coming_date: input.coming_date,
            coming_time: input.coming_time,
            stay_time: input.stay_time,
            exclude_id: None,
        };
        check_schedule(&mut tx, &candidate, now, true).await?;

        let query = format!(
            "INSERT INTO guests
                (guest_type_id, inviter_id, coming_date, coming_time, stay_time, comment)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let guest = sqlx::query_as::<_, Guest>(&query)
            .bind(input.guest_type_id)
            .bind(input.inviter_id)
            .bind(input.coming_date)
            .bind(input.coming_time)
            .bind(input.stay_time)
            .bind(&input.comment)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(guest)
    }

    /// Validate and apply an update to an existing guest.
    ///
    /// The update is merged onto the stored row and the result is validated
    /// like a new guest, except that the guest never conflicts with itself
    /// and the past-date rules only apply when the date or time changes.
    ///
    /// Returns `Ok(None)` if no guest with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateGuest,
        now: NaiveDateTime,
    ) -> Result<Option<Guest>, GuestWriteError> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM guests WHERE id = $1 FOR UPDATE");
        let Some(existing) = sqlx::query_as::<_, Guest>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let merged = input.merge_onto(&existing);

        ensure_references(&mut tx, merged.guest_type_id, merged.inviter_id).await?;
        lock_dates(&mut tx, &[existing.coming_date, merged.coming_date]).await?;

        let rescheduled = merged.coming_date != existing.coming_date
            || merged.coming_time != existing.coming_time;
        let candidate = ScheduleCandidate {
            coming_date: merged.coming_date,
            coming_time: merged.coming_time,
            stay_time: merged.stay_time,
            exclude_id: Some(id),
        };
        check_schedule(&mut tx, &candidate, now, rescheduled).await?;

        let query = format!(
            "UPDATE guests SET
                guest_type_id = $2,
                inviter_id = $3,
                coming_date = $4,
                coming_time = $5,
                stay_time = $6,
                comment = $7
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let guest = sqlx::query_as::<_, Guest>(&query)
            .bind(id)
            .bind(merged.guest_type_id)
            .bind(merged.inviter_id)
            .bind(merged.coming_date)
            .bind(merged.coming_time)
            .bind(merged.stay_time)
            .bind(&merged.comment)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(guest))
    }

    /// Find a guest by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Guest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM guests WHERE id = $1");
        sqlx::query_as::<_, Guest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List one page of guests matching `filter`, in schedule order.
    pub async fn list(
        pool: &PgPool,
        filter: &GuestFilter,
        page: PageRequest,
    ) -> Result<Vec<Guest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM guests
             WHERE {FILTER}
             ORDER BY coming_date, coming_time, id
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Guest>(&query)
            .bind(filter.inviter_id)
            .bind(filter.guest_type_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Number of guests matching `filter`.
    pub async fn count(pool: &PgPool, filter: &GuestFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM guests WHERE {FILTER}");
        sqlx::query_scalar(&query)
            .bind(filter.inviter_id)
            .bind(filter.guest_type_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .fetch_one(pool)
            .await
    }

    /// Whether any guest references the given guest type.
    pub async fn exists_for_guest_type(
        pool: &PgPool,
        guest_type_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM guests WHERE guest_type_id = $1)")
            .bind(guest_type_id)
            .fetch_one(pool)
            .await
    }

    /// Whether any guest names the given user as inviter.
    pub async fn exists_for_inviter(pool: &PgPool, inviter_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM guests WHERE inviter_id = $1)")
            .bind(inviter_id)
            .fetch_one(pool)
            .await
    }

    /// Permanently delete a guest. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM guests WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Fail with `NotFound` unless both referenced rows exist.
async fn ensure_references(
    conn: &mut PgConnection,
    guest_type_id: DbId,
    inviter_id: DbId,
) -> Result<(), GuestWriteError> {
    let type_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM guest_types WHERE id = $1)")
            .bind(guest_type_id)
            .fetch_one(&mut *conn)
            .await?;
    if !type_exists {
        return Err(CoreError::NotFound {
            entity: "GuestType",
            id: guest_type_id,
        }
        .into());
    }

    let inviter_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(inviter_id)
            .fetch_one(&mut *conn)
            .await?;
    if !inviter_exists {
        return Err(CoreError::NotFound {
            entity: "User",
            id: inviter_id,
        }
        .into());
    }

    Ok(())
}

/// Take the schedule lock for each distinct date, in ascending order.
///
/// The locks are transaction-scoped and released on commit or rollback.
async fn lock_dates(conn: &mut PgConnection, dates: &[NaiveDate]) -> Result<(), sqlx::Error> {
    let mut days: Vec<i32> = dates.iter().map(|d| d.num_days_from_ce()).collect();
    days.sort_unstable();
    days.dedup();

    for day in days {
        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(SCHEDULE_LOCK_NAMESPACE)
            .bind(day)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Load the visits already stored on `date`.
async fn visits_on(
    conn: &mut PgConnection,
    date: NaiveDate,
) -> Result<Vec<ScheduledVisit>, sqlx::Error> {
    let query =
        format!("SELECT {COLUMNS} FROM guests WHERE coming_date = $1 ORDER BY coming_time");
    let rows = sqlx::query_as::<_, Guest>(&query)
        .bind(date)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.iter().map(ScheduledVisit::from).collect())
}

/// Run the validator against the stored visits on the candidate's date.
async fn check_schedule(
    conn: &mut PgConnection,
    candidate: &ScheduleCandidate,
    now: NaiveDateTime,
    check_past: bool,
) -> Result<(), GuestWriteError> {
    let window =
        schedule::check_fields(candidate, now, check_past).map_err(CoreError::FieldFormat)?;
    let existing = visits_on(conn, candidate.coming_date).await?;

    if let Some(conflict_id) = schedule::find_conflict(
        candidate.coming_date,
        &window,
        candidate.exclude_id,
        &existing,
    ) {
        tracing::warn!(
            coming_date = %candidate.coming_date,
            coming_time = %candidate.coming_time,
            conflict_id,
            "Guest visit rejected: schedule overlap"
        );
        return Err(CoreError::ScheduleConflict.into());
    }
    Ok(())
}
