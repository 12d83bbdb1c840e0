//! Route definitions for the `/guests` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::guests;
use crate::state::AppState;

/// Routes mounted at `/guests`.
///
/// ```text
/// GET    /        -> list_guests (?page, per_page, inviter_id, guest_type_id, start_date, end_date)
/// POST   /        -> create_guest
/// GET    /{id}    -> get_guest
/// PUT    /{id}    -> replace_guest
/// PATCH  /{id}    -> patch_guest
/// DELETE /{id}    -> delete_guest
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(guests::list_guests).post(guests::create_guest))
        .route(
            "/{id}",
            get(guests::get_guest)
                .put(guests::replace_guest)
                .patch(guests::patch_guest)
                .delete(guests::delete_guest),
        )
}
