use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use guestbook_core::error::CoreError;
use guestbook_core::validation::FieldErrors;
use guestbook_db::repositories::GuestWriteError;
use serde_json::json;

/// Error returned by every guestbook handler and extractor.
///
/// Domain failures arrive as [`CoreError`]; anything the database refuses
/// arrives as [`sqlx::Error`] and is classified by SQLSTATE. Rendered as
/// `{ "error": message, "code": CODE }`, plus a `fields` list when the
/// client sent bad field values.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `guestbook_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<GuestWriteError> for AppError {
    fn from(err: GuestWriteError) -> Self {
        match err {
            GuestWriteError::Core(core) => AppError::Core(core),
            GuestWriteError::Database(db) => AppError::Database(db),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::FieldFormat(fields) => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    format!("Validation failed: {fields}"),
                ),
                CoreError::ScheduleConflict => (
                    StatusCode::CONFLICT,
                    "SCHEDULE_CONFLICT",
                    core.to_string(),
                ),
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),
        };

        let fields = match &self {
            AppError::Core(CoreError::FieldFormat(fields)) => Some(fields.clone()),
            AppError::Database(err) => check_violation_fields(err),
            _ => None,
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(fields) = fields {
            body["fields"] = json!(fields);
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map
///   to 409, with a dedicated message for the known constraints.
/// - Foreign key violations map to 409.
/// - Check violations on a `ck_` constraint are client input and map to 400
///   `VALIDATION_ERROR`.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if let Some(fields) = check_violation_fields(err) {
        return (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Validation failed: {fields}"),
        );
    }

    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                // unique_violation
                Some("23505") if constraint.starts_with("uq_") => {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        unique_violation_message(constraint),
                    );
                }
                // foreign_key_violation
                Some("23503") => {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Operation violates foreign key constraint: {constraint}"),
                    );
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

fn unique_violation_message(constraint: &str) -> String {
    match constraint {
        "uq_users_email" => "Email already exists".to_string(),
        "uq_users_username" => "Username already exists".to_string(),
        "uq_guest_types_name" => "Guest type already exists".to_string(),
        other => format!("Duplicate value violates unique constraint: {other}"),
    }
}

/// Field errors for a `check_violation` (SQLSTATE 23514) on a `ck_`
/// constraint, or `None` for any other error.
fn check_violation_fields(err: &sqlx::Error) -> Option<FieldErrors> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    if db_err.code().as_deref() != Some("23514") {
        return None;
    }
    let constraint = db_err.constraint().filter(|c| c.starts_with("ck_"))?;

    let mut fields = FieldErrors::new();
    match constraint {
        "ck_guests_stay_positive" => {
            fields.push("stay_time", "Stay time must be greater than zero");
        }
        "ck_guests_comment_length" => {
            fields.push("comment", "Comment must be at most 256 characters");
        }
        other => fields.push("body", format!("Value violates check constraint: {other}")),
    }
    Some(fields)
}
