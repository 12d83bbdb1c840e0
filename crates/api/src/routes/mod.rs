pub mod auth;
pub mod guest_types;
pub mod guests;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                  login (public)
/// /auth/refresh                refresh (public)
/// /auth/logout                 logout (requires auth)
///
/// /users                       list (auth), signup (public)
/// /users/{id}                  get, replace, patch, delete (auth; own account only for writes)
/// /users/{id}/guests           guests invited by the user (auth)
///
/// /guest-types                 list, create (auth)
/// /guest-types/{id}            get, rename, delete (auth)
///
/// /guests                      list with filters, create (auth)
/// /guests/{id}                 get, replace, patch, delete (auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/guest-types", guest_types::router())
        .nest("/guests", guests::router())
}
