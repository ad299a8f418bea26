//! Route definitions for the `/sensor-data` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::sensor_data;
use crate::state::AppState;

/// Routes mounted at `/sensor-data`.
///
/// ```text
/// POST  /         -> ingest (x-api-key)
/// GET   /         -> list (filters + page/limit)
/// GET   /recent   -> recent (?projects=1,2&limit=20)
/// GET   /export   -> export (CSV)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sensor_data::list).post(sensor_data::ingest))
        .route("/recent", get(sensor_data::recent))
        .route("/export", get(sensor_data::export))
}
