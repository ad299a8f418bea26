pub mod auth;
pub mod devices;
pub mod health;
pub mod projects;
pub mod sensor_data;
pub mod thresholds;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws?token=                               push channel (WebSocket)
///
/// /auth/login                              login (public)
/// /auth/me                                 current user
/// /auth/me/activity                        own audit entries
/// /auth/profile                            get, update own profile
/// /auth/logout                             logout
/// /auth/register                           create user (admins)
///
/// /users                                   list (admins)
/// /users/{id}                              get, update, delete
///
/// /projects                                list, create
/// /projects/{id}                           get, update, delete
/// /projects/{id}/regenerate-key            rotate API key
/// /projects/{id}/members                   list, add
/// /projects/{id}/members/{user_id}         remove
///
/// /devices                                 list, create
/// /devices/{id}                            get, update, delete
///
/// /thresholds/defaults                     list, upsert global defaults
/// /thresholds/projects/{project_id}        merged view, upsert override
/// /thresholds/devices/{device_id}          merged view, upsert override
/// /thresholds/resolve                      resolve preview
/// /thresholds/{id}                         delete
///
/// /sensor-data                             ingest (API key), list
/// /sensor-data/recent                      latest readings
/// /sensor-data/export                      CSV export
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/projects", projects::router())
        .nest("/devices", devices::router())
        .nest("/thresholds", thresholds::router())
        .nest("/sensor-data", sensor_data::router())
}
