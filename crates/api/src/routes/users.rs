//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /              -> list_users
/// POST   /              -> create_user (public signup)
/// GET    /{id}          -> get_user
/// PUT    /{id}          -> replace_user
/// PATCH  /{id}          -> patch_user
/// DELETE /{id}          -> delete_user
/// GET    /{id}/guests   -> list_user_guests
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::replace_user)
                .patch(users::patch_user)
                .delete(users::delete_user),
        )
        .route("/{id}/guests", get(users::list_user_guests))
}
