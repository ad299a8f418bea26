//! Route definitions for the `/projects` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::projects;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET, POST          /                          -> list, create
/// GET, PUT, DELETE   /{id}                      -> get, update, delete
/// POST               /{id}/regenerate-key       -> regenerate_key
/// GET, POST          /{id}/members              -> list_members, add_member
/// DELETE             /{id}/members/{user_id}    -> remove_member
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list).post(projects::create))
        .route(
            "/{id}",
            get(projects::get)
                .put(projects::update)
                .delete(projects::delete),
        )
        .route("/{id}/regenerate-key", post(projects::regenerate_key))
        .route(
            "/{id}/members",
            get(projects::list_members).post(projects::add_member),
        )
        .route("/{id}/members/{user_id}", delete(projects::remove_member))
}
