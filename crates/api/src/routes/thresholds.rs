//! Route definitions for the `/thresholds` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::thresholds;
use crate::state::AppState;

/// Routes mounted at `/thresholds`.
///
/// ```text
/// GET, PUT   /defaults                  -> list_defaults, upsert_default (superadmin)
/// GET, PUT   /projects/{project_id}     -> list_for_project, upsert_for_project
/// GET, PUT   /devices/{device_id}       -> list_for_device, upsert_for_device
/// GET        /resolve                   -> resolve (?sensor_type, device_id, project_id)
/// DELETE     /{id}                      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/defaults",
            get(thresholds::list_defaults).put(thresholds::upsert_default),
        )
        .route(
            "/projects/{project_id}",
            get(thresholds::list_for_project).put(thresholds::upsert_for_project),
        )
        .route(
            "/devices/{device_id}",
            get(thresholds::list_for_device).put(thresholds::upsert_for_device),
        )
        .route("/resolve", get(thresholds::resolve))
        .route("/{id}", delete(thresholds::delete))
}
