//! Handlers for the `/guests` resource.
//!
//! Every write is validated against the same-day schedule by
//! [`GuestRepo::create`] / [`GuestRepo::update`]. An overlapping visit is
//! answered with 409 `SCHEDULE_CONFLICT`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use guestbook_core::error::CoreError;
use guestbook_core::types::DbId;
use guestbook_core::validation::validate_comment;
use guestbook_db::models::guest::{CreateGuest, Guest, UpdateGuest};
use guestbook_db::repositories::GuestRepo;
use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationErrors};

use crate::error::{AppError, AppResult};
use crate::extract::{ValidJson, ValidQuery};
use crate::middleware::auth::AuthUser;
use crate::query::GuestListParams;
use crate::response::PageResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /guests` and `PUT /guests/{id}`.
///
/// Dates are `YYYY-MM-DD`; `coming_time` and `stay_time` are `HH:MM:SS`.
#[derive(Debug, Deserialize, Validate)]
pub struct GuestRequest {
    pub guest_type_id: DbId,
    pub inviter_id: DbId,
    pub coming_date: NaiveDate,
    pub coming_time: NaiveTime,
    pub stay_time: NaiveTime,
    #[validate(custom(function = "validate_comment"))]
    pub comment: Option<String>,
}

impl From<GuestRequest> for CreateGuest {
    fn from(input: GuestRequest) -> Self {
        CreateGuest {
            guest_type_id: input.guest_type_id,
            inviter_id: input.inviter_id,
            coming_date: input.coming_date,
            coming_time: input.coming_time,
            stay_time: input.stay_time,
            comment: input.comment,
        }
    }
}

/// Request body for `PATCH /guests/{id}`. Absent fields are left unchanged;
/// `"comment": null` clears the comment.
#[derive(Debug, Default, Deserialize)]
pub struct PatchGuestRequest {
    pub guest_type_id: Option<DbId>,
    pub inviter_id: Option<DbId>,
    pub coming_date: Option<NaiveDate>,
    pub coming_time: Option<NaiveTime>,
    pub stay_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub comment: Option<Option<String>>,
}

impl Validate for PatchGuestRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match &self.comment {
            Some(Some(comment)) => validate_comment(comment).map_err(|err| {
                let mut errors = ValidationErrors::new();
                errors.add("comment", err);
                errors
            }),
            _ => Ok(()),
        }
    }
}

impl From<PatchGuestRequest> for UpdateGuest {
    fn from(input: PatchGuestRequest) -> Self {
        UpdateGuest {
            guest_type_id: input.guest_type_id,
            inviter_id: input.inviter_id,
            coming_date: input.coming_date,
            coming_time: input.coming_time,
            stay_time: input.stay_time,
            comment: input.comment,
        }
    }
}

/// Present-but-null deserializes to `Some(None)`; absence is handled by
/// `#[serde(default)]`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/guests
///
/// Paginated listing with optional `inviter_id`, `guest_type_id`,
/// `start_date` and `end_date` filters.
pub async fn list_guests(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidQuery(params): ValidQuery<GuestListParams>,
) -> AppResult<Json<PageResponse<Guest>>> {
    let page = params.to_request();
    let filter = params.to_filter();
    let guests = GuestRepo::list(&state.pool, &filter, page).await?;
    let total = GuestRepo::count(&state.pool, &filter).await?;
    Ok(Json(PageResponse::new(guests, page, total)))
}

/// POST /api/v1/guests
pub async fn create_guest(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(input): ValidJson<GuestRequest>,
) -> AppResult<(StatusCode, Json<Guest>)> {
    let guest = GuestRepo::create(&state.pool, &CreateGuest::from(input), local_now()).await?;
    tracing::info!(
        guest_id = guest.id,
        coming_date = %guest.coming_date,
        user_id = auth.user_id,
        "Guest created"
    );
    Ok((StatusCode::CREATED, Json(guest)))
}

/// GET /api/v1/guests/{id}
pub async fn get_guest(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Guest>> {
    let guest = GuestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Guest", id }))?;
    Ok(Json(guest))
}

/// PUT /api/v1/guests/{id}
///
/// Replace every field, including clearing the comment when it is omitted.
pub async fn replace_guest(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<GuestRequest>,
) -> AppResult<Json<Guest>> {
    let update_dto = UpdateGuest::replace_with(CreateGuest::from(input));
    apply_update(&state, &auth, id, &update_dto).await
}

/// PATCH /api/v1/guests/{id}
///
/// Merge the supplied fields onto the stored guest, then validate the result
/// like a full update.
pub async fn patch_guest(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<PatchGuestRequest>,
) -> AppResult<Json<Guest>> {
    let update_dto = UpdateGuest::from(input);
    apply_update(&state, &auth, id, &update_dto).await
}

/// DELETE /api/v1/guests/{id}
pub async fn delete_guest(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if GuestRepo::delete(&state.pool, id).await? {
        tracing::info!(guest_id = id, user_id = auth.user_id, "Guest deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Guest", id }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Server-local wall-clock time, the reference for "not in the past".
fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

async fn apply_update(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
    update_dto: &UpdateGuest,
) -> AppResult<Json<Guest>> {
    let guest = GuestRepo::update(&state.pool, id, update_dto, local_now())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Guest", id }))?;
    tracing::info!(guest_id = id, user_id = auth.user_id, "Guest updated");
    Ok(Json(guest))
}
