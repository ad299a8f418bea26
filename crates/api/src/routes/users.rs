//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET                /       -> list (superadmin, projectadmin)
/// GET, PUT, DELETE   /{id}   -> get, update, delete (superadmin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(users::list)).route(
        "/{id}",
        get(users::get).put(users::update).delete(users::delete),
    )
}
