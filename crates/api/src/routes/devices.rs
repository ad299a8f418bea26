//! Route definitions for the `/devices` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::devices;
use crate::state::AppState;

/// Routes mounted at `/devices`.
///
/// ```text
/// GET, POST          /       -> list (?project_id), create
/// GET, PUT, DELETE   /{id}   -> get, update, delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(devices::list).post(devices::create))
        .route(
            "/{id}",
            get(devices::get).put(devices::update).delete(devices::delete),
        )
}
