//! Route definitions for the `/guest-types` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::guest_types;
use crate::state::AppState;

/// Routes mounted at `/guest-types`.
///
/// ```text
/// GET    /        -> list_guest_types
/// POST   /        -> create_guest_type
/// GET    /{id}    -> get_guest_type
/// PUT    /{id}    -> update_guest_type
/// DELETE /{id}    -> delete_guest_type
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(guest_types::list_guest_types).post(guest_types::create_guest_type),
        )
        .route(
            "/{id}",
            get(guest_types::get_guest_type)
                .put(guest_types::update_guest_type)
                .delete(guest_types::delete_guest_type),
        )
}
