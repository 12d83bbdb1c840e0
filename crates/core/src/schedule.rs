//! Guest visit scheduling rules.
//!
//! A guest occupies the window `[coming_time, coming_time + stay_time]` on
//! `coming_date`, where `stay_time` is a time-of-day value read as an elapsed
//! duration. Windows never cross midnight.
//!
//! Boundary policy, used everywhere in this module:
//!
//! - Two windows on the same date overlap when
//!   `a.check_in <= b.exit && a.exit >= b.check_in`. Both ends are inclusive,
//!   so a guest arriving exactly when another leaves is a conflict.
//! - A date is in the past when it is strictly before today. A check-in time
//!   on today's date is in the past when it is strictly before the current
//!   time of day.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::CoreError;
use crate::types::DbId;
use crate::validation::FieldErrors;

/// Closed interval of wall-clock time within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitWindow {
    pub check_in: NaiveTime,
    pub exit: NaiveTime,
}

impl VisitWindow {
    /// Build a window from a check-in time and a stay expressed as a time of
    /// day. Returns `None` when the stay would run into the next day.
    pub fn new(check_in: NaiveTime, stay: NaiveTime) -> Option<Self> {
        exit_time(check_in, stay).map(|exit| Self { check_in, exit })
    }

    /// Boundary-inclusive overlap test.
    pub fn overlaps(&self, other: &VisitWindow) -> bool {
        other.check_in <= self.exit && other.exit >= self.check_in
    }
}

/// Interpret a time-of-day value as elapsed hours, minutes, and seconds.
pub fn stay_duration(stay: NaiveTime) -> Duration {
    Duration::seconds(i64::from(stay.num_seconds_from_midnight()))
        + Duration::nanoseconds(i64::from(stay.nanosecond()))
}

/// `check_in + stay` on the same day, or `None` if that reaches midnight.
pub fn exit_time(check_in: NaiveTime, stay: NaiveTime) -> Option<NaiveTime> {
    let (exit, wrapped_secs) = check_in.overflowing_add_signed(stay_duration(stay));
    (wrapped_secs == 0).then_some(exit)
}

/// An already stored guest, as seen by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledVisit {
    pub id: DbId,
    pub coming_date: NaiveDate,
    pub coming_time: NaiveTime,
    pub stay_time: NaiveTime,
}

impl ScheduledVisit {
    /// Stored rows that somehow run past midnight are treated as ending at
    /// the last instant of the day.
    pub fn window(&self) -> VisitWindow {
        let exit = exit_time(self.coming_time, self.stay_time)
            .or_else(|| NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999))
            .unwrap_or(self.coming_time);
        VisitWindow {
            check_in: self.coming_time,
            exit,
        }
    }
}

/// A proposed guest visit awaiting validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleCandidate {
    pub coming_date: NaiveDate,
    pub coming_time: NaiveTime,
    pub stay_time: NaiveTime,
    /// Guest being replaced by this write; never conflicts with itself.
    pub exclude_id: Option<DbId>,
}

/// Field-level checks that precede the overlap search.
///
/// `check_past` controls the "not in the past" rules. They apply to creates
/// and to updates that change the date or time; an update that only touches
/// other fields of a guest keeps its stored date and time unchallenged.
pub fn check_fields(
    candidate: &ScheduleCandidate,
    now: NaiveDateTime,
    check_past: bool,
) -> Result<VisitWindow, FieldErrors> {
    let mut errors = FieldErrors::new();

    if check_past {
        let today = now.date();
        if candidate.coming_date < today {
            errors.push("coming_date", "Date cannot be in the past");
        } else if candidate.coming_date == today && candidate.coming_time < now.time() {
            errors.push("coming_time", "Time cannot be in the past");
        }
    }

    // Stored as TIME, which keeps microseconds; fractions would let two
    // windows that touch after rounding pass as disjoint here.
    if candidate.coming_time.nanosecond() != 0 {
        errors.push("coming_time", "Time must be given in whole seconds");
    }

    let window = if candidate.stay_time.nanosecond() != 0 {
        errors.push("stay_time", "Stay time must be given in whole seconds");
        None
    } else if stay_duration(candidate.stay_time) == Duration::zero() {
        errors.push("stay_time", "Stay time must be greater than zero");
        None
    } else {
        let window = VisitWindow::new(candidate.coming_time, candidate.stay_time);
        if window.is_none() {
            errors.push("stay_time", "Visit must end before midnight");
        }
        window
    };

    match window {
        Some(window) if errors.is_empty() => Ok(window),
        _ => Err(errors),
    }
}

/// Id of the first existing visit that overlaps `window` on `date`.
///
/// Rows on other dates and the row named by `exclude_id` are ignored.
pub fn find_conflict<'a, I>(
    date: NaiveDate,
    window: &VisitWindow,
    exclude_id: Option<DbId>,
    existing: I,
) -> Option<DbId>
where
    I: IntoIterator<Item = &'a ScheduledVisit>,
{
    existing
        .into_iter()
        .filter(|visit| visit.coming_date == date)
        .filter(|visit| Some(visit.id) != exclude_id)
        .find(|visit| visit.window().overlaps(window))
        .map(|visit| visit.id)
}

/// Validate a candidate against the visits already stored for its date.
///
/// Returns the candidate's window on success. Field problems are reported as
/// [`CoreError::FieldFormat`] before any overlap is considered; an overlap is
/// reported as [`CoreError::ScheduleConflict`].
pub fn validate(
    candidate: &ScheduleCandidate,
    existing: &[ScheduledVisit],
    now: NaiveDateTime,
    check_past: bool,
) -> Result<VisitWindow, CoreError> {
    let window = check_fields(candidate, now, check_past).map_err(CoreError::FieldFormat)?;

    match find_conflict(candidate.coming_date, &window, candidate.exclude_id, existing) {
        Some(_) => Err(CoreError::ScheduleConflict),
        None => Ok(window),
    }
}
