//! Handlers for the `/guest-types` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use guestbook_core::error::CoreError;
use guestbook_core::types::DbId;
use guestbook_core::validation::validate_guest_type_name;
use guestbook_db::models::guest_type::GuestType;
use guestbook_db::repositories::{GuestRepo, GuestTypeRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidJson, ValidQuery};
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::PageResponse;
use crate::state::AppState;

/// Request body for `POST /guest-types` and `PUT /guest-types/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct GuestTypeRequest {
    #[validate(
        length(min = 5, max = 50),
        custom(function = "validate_guest_type_name")
    )]
    pub name: String,
}

/// GET /api/v1/guest-types
pub async fn list_guest_types(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidQuery(params): ValidQuery<PageParams>,
) -> AppResult<Json<PageResponse<GuestType>>> {
    let page = params.to_request();
    let guest_types = GuestTypeRepo::list(&state.pool, page).await?;
    let total = GuestTypeRepo::count(&state.pool).await?;
    Ok(Json(PageResponse::new(guest_types, page, total)))
}

/// POST /api/v1/guest-types
pub async fn create_guest_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidJson(input): ValidJson<GuestTypeRequest>,
) -> AppResult<(StatusCode, Json<GuestType>)> {
    let guest_type = GuestTypeRepo::create(&state.pool, &input.name).await?;
    tracing::info!(guest_type_id = guest_type.id, name = %guest_type.name, "Guest type created");
    Ok((StatusCode::CREATED, Json(guest_type)))
}

/// GET /api/v1/guest-types/{id}
pub async fn get_guest_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<GuestType>> {
    let guest_type = GuestTypeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "GuestType",
            id,
        }))?;
    Ok(Json(guest_type))
}

/// PUT /api/v1/guest-types/{id}
pub async fn update_guest_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<GuestTypeRequest>,
) -> AppResult<Json<GuestType>> {
    let guest_type = GuestTypeRepo::rename(&state.pool, id, &input.name)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "GuestType",
            id,
        }))?;
    tracing::info!(guest_type_id = id, name = %guest_type.name, "Guest type renamed");
    Ok(Json(guest_type))
}

/// DELETE /api/v1/guest-types/{id}
///
/// Refused with 409 while any guest references the type. Returns 204 No Content.
pub async fn delete_guest_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if GuestRepo::exists_for_guest_type(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Guest type is assigned to existing guests".into(),
        )));
    }

    if GuestTypeRepo::delete(&state.pool, id).await? {
        tracing::info!(guest_type_id = id, "Guest type deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "GuestType",
            id,
        }))
    }
}
