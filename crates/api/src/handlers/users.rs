//! Handlers for the `/users` resource.
//!
//! Signup is public. Everything else requires a valid access token, and only
//! the account owner may modify or delete an account.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use guestbook_core::error::CoreError;
use guestbook_core::types::DbId;
use guestbook_core::validation::{validate_password, validate_username};
use guestbook_db::models::guest::{Guest, GuestFilter};
use guestbook_db::models::user::{CreateUser, UpdateUser, UserResponse};
use guestbook_db::repositories::{GuestRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::extract::{ValidJson, ValidQuery};
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::PageResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users` and `PUT /users/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UserRequest {
    #[validate(length(min = 3, max = 50), custom(function = "validate_username"))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 256), custom(function = "validate_password"))]
    pub password: String,
}

/// Request body for `PATCH /users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct PatchUserRequest {
    #[validate(length(min = 3, max = 50), custom(function = "validate_username"))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 256), custom(function = "validate_password"))]
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/users
///
/// Public signup. Hashes the password and returns the new user with 201.
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<UserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let create_dto = CreateUser {
        username: input.username,
        email: input.email,
        password_hash: hash(&input.password)?,
    };

    let user = UserRepo::create(&state.pool, &create_dto).await?;
    tracing::info!(user_id = user.id, "User signed up");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidQuery(params): ValidQuery<PageParams>,
) -> AppResult<Json<PageResponse<UserResponse>>> {
    let page = params.to_request();
    let users = UserRepo::list(&state.pool, page).await?;
    let total = UserRepo::count(&state.pool).await?;

    let data = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(PageResponse::new(data, page, total)))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    Ok(Json(UserResponse::from(user)))
}

/// PUT /api/v1/users/{id}
///
/// Replace every field of the caller's own account.
pub async fn replace_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<UserRequest>,
) -> AppResult<Json<UserResponse>> {
    auth.ensure_self(id)?;

    let update_dto = UpdateUser {
        username: Some(input.username),
        email: Some(input.email),
        password_hash: Some(hash(&input.password)?),
    };
    apply_update(&state, id, &update_dto).await
}

/// PATCH /api/v1/users/{id}
///
/// Update any subset of the caller's own account fields.
pub async fn patch_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<PatchUserRequest>,
) -> AppResult<Json<UserResponse>> {
    auth.ensure_self(id)?;

    let password_hash = match &input.password {
        Some(password) => Some(hash(password)?),
        None => None,
    };
    let update_dto = UpdateUser {
        username: input.username,
        email: input.email,
        password_hash,
    };
    apply_update(&state, id, &update_dto).await
}

/// DELETE /api/v1/users/{id}
///
/// Delete the caller's own account. Refused with 409 while the user is the
/// inviter of any guest. Returns 204 No Content.
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.ensure_self(id)?;

    if GuestRepo::exists_for_inviter(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "User is the inviter of existing guests".into(),
        )));
    }

    if UserRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = id, "User deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}

/// GET /api/v1/users/{id}/guests
///
/// Guests invited by the user, in schedule order.
pub async fn list_user_guests(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
    ValidQuery(params): ValidQuery<PageParams>,
) -> AppResult<Json<PageResponse<Guest>>> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    let filter = GuestFilter {
        inviter_id: Some(id),
        ..GuestFilter::default()
    };
    let page = params.to_request();
    let guests = GuestRepo::list(&state.pool, &filter, page).await?;
    let total = GuestRepo::count(&state.pool, &filter).await?;

    Ok(Json(PageResponse::new(guests, page, total)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn hash(password: &str) -> AppResult<String> {
    hash_password(password)
        .map_err(|e| CoreError::Internal(format!("Password hashing error: {e}")).into())
}

async fn apply_update(
    state: &AppState,
    id: DbId,
    update_dto: &UpdateUser,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::update(&state.pool, id, update_dto)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(user_id = id, "User updated");
    Ok(Json(UserResponse::from(user)))
}
