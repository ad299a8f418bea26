//! Handlers for the `/sensor-data` resource.
//!
//! Devices push readings with their project's API key. Each reading is
//! resolved against the threshold override chain, classified, stored and
//! published for dashboard push. Dashboard users query, tail and export
//! readings for the projects they can access.

use aquamon_core::alert::classify;
use aquamon_core::audit::{actions, resources};
use aquamon_core::error::CoreError;
use aquamon_core::event_names::EVENT_READING_CREATED;
use aquamon_core::threshold::ThresholdSource;
use aquamon_core::types::{DbId, Timestamp};
use aquamon_db::models::audit::CreateAuditLog;
use aquamon_db::models::reading::{CreateReading, Reading, ReadingExportRow, ReadingQuery};
use aquamon_db::repositories::{DeviceRepo, ReadingRepo};
use aquamon_events::MonitoringEvent;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::access::{accessible_projects, ensure_project_access};
use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::api_key::ProjectApiKey;
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::query::{parse_id_list, PageParams};
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// Default and maximum row counts for `GET /sensor-data/recent`.
const DEFAULT_RECENT_LIMIT: i64 = 20;
const MAX_RECENT_LIMIT: i64 = 500;

/// Header row of the CSV export.
pub const CSV_HEADER: &str = "Timestamp,Project,Device,DeviceID,SensorType,Value,Unit,Alert";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /sensor-data`, in the field devices' camelCase.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    /// External device key, not the database id.
    #[validate(length(min = 1, message = "is required"))]
    pub device_id: String,
    #[validate(length(min = 1, message = "must contain at least one reading"))]
    pub readings: Vec<IngestReading>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReading {
    pub sensor_type: String,
    pub value: f64,
    /// Server time when absent.
    pub timestamp: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub count: usize,
    pub data: Vec<Reading>,
}

/// Query parameters shared by listing and export.
///
/// Kept flat because `serde(flatten)` does not mix with numeric query
/// parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SensorDataParams {
    pub project_id: Option<DbId>,
    pub device_id: Option<DbId>,
    pub sensor_type: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub alerts_only: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl SensorDataParams {
    fn filter(&self) -> ReadingQuery {
        ReadingQuery {
            project_id: self.project_id,
            device_id: self.device_id,
            sensor_type: self.sensor_type.clone(),
            from: self.from,
            to: self.to,
            alerts_only: self.alerts_only,
            accessible_projects: None,
        }
    }

    fn paging(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    /// Comma-separated project ids.
    pub projects: Option<String>,
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Ingest
// ---------------------------------------------------------------------------

/// POST /api/v1/sensor-data
///
/// Authenticated by `x-api-key`. Readings for sensor types the device has
/// not registered are skipped. Every reading is resolved and classified
/// before any is stored, and the batch is written in one transaction, so a
/// failure part-way leaves nothing stored and nothing broadcast.
pub async fn ingest(
    State(state): State<AppState>,
    ProjectApiKey(project): ProjectApiKey,
    client: ClientInfo,
    Json(input): Json<IngestRequest>,
) -> AppResult<(StatusCode, Json<IngestResponse>)> {
    input.validate()?;

    let device = DeviceRepo::find_by_key(&state.pool, &input.device_id)
        .await?
        .filter(|d| d.project_id == project.id)
        .ok_or_else(|| {
            AppError::NotFound("Device not found or not associated with this project".into())
        })?;

    if !device.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Device is deactivated".into(),
        )));
    }

    DeviceRepo::mark_seen(&state.pool, device.id).await?;

    let mut pending = Vec::with_capacity(input.readings.len());
    for reading in &input.readings {
        if !device.reports(&reading.sensor_type) {
            tracing::debug!(
                device_key = %device.device_key,
                sensor_type = %reading.sensor_type,
                "Skipping reading for unregistered sensor type"
            );
            continue;
        }

        let threshold = state
            .resolver
            .resolve(&reading.sensor_type, Some(device.id), Some(project.id))
            .await?;
        if threshold.source == ThresholdSource::Generic {
            tracing::warn!(
                sensor_type = %reading.sensor_type,
                device_id = device.id,
                "No threshold configured for sensor type, using generic range"
            );
        }

        let outcome = classify(&threshold.bounds, reading.value);
        if outcome.is_alert {
            tracing::info!(
                device_id = device.id,
                project_id = project.id,
                level = %outcome.alert_level,
                message = %outcome.message,
                "Reading raised an alert"
            );
        }

        pending.push(CreateReading {
            device_id: device.id,
            project_id: project.id,
            sensor_type: reading.sensor_type.clone(),
            value: reading.value,
            unit: outcome.unit,
            is_alert: outcome.is_alert,
            alert_level: outcome.alert_level.as_str().to_string(),
            alert_message: (!outcome.message.is_empty()).then_some(outcome.message),
            recorded_at: reading.timestamp,
        });
    }

    // The batch is stored atomically and only announced once committed.
    let stored = ReadingRepo::create_batch(&state.pool, &pending).await?;
    for row in &stored {
        state.event_bus.publish(reading_event(row));
    }

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(project.id),
            details: Some(serde_json::json!({
                "device_key": device.device_key,
                "received": input.readings.len(),
                "stored": stored.len(),
            })),
            ..audit::entry(&client, None, actions::API_ACCESS, resources::SENSOR_DATA)
        },
    );

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            count: stored.len(),
            data: stored,
        }),
    ))
}

/// Bus event announcing a stored reading to its project's subscribers.
pub fn reading_event(reading: &Reading) -> MonitoringEvent {
    MonitoringEvent::new(EVENT_READING_CREATED)
        .with_project(reading.project_id)
        .with_source(resources::DEVICE, reading.device_id)
        .with_payload(serde_json::to_value(reading).unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /api/v1/sensor-data
///
/// Filtered, page-numbered readings, newest first.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Query(params): Query<SensorDataParams>,
) -> AppResult<Json<PageResponse<Reading>>> {
    let filter = scoped_filter(&state, &auth, &params).await?;
    let paging = params.paging();

    let total_count = ReadingRepo::count(&state.pool, &filter).await?;
    let rows = ReadingRepo::list(&state.pool, &filter, paging.limit(), paging.offset()).await?;

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: params.project_id,
            details: Some(serde_json::json!({ "records": rows.len() })),
            ..audit::entry(&client, Some(auth.user_id), actions::VIEW, resources::SENSOR_DATA)
        },
    );

    Ok(Json(PageResponse::new(
        rows,
        total_count,
        paging.page(),
        paging.limit(),
    )))
}

/// GET /api/v1/sensor-data/recent?projects=1,2&limit=20
///
/// Latest readings across the requested projects, or across every
/// accessible project when none are named.
pub async fn recent(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<RecentParams>,
) -> AppResult<Json<DataResponse<Vec<Reading>>>> {
    let requested = params
        .projects
        .as_deref()
        .map(parse_id_list)
        .unwrap_or_default();
    let accessible = accessible_projects(&state.pool, &auth).await?;
    let scope = recent_scope(requested, accessible);

    let limit = params
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .clamp(1, MAX_RECENT_LIMIT);
    let rows = ReadingRepo::recent(&state.pool, scope.as_deref(), limit).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/sensor-data/export
///
/// CSV download of up to 10 000 matching readings.
pub async fn export(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Query(params): Query<SensorDataParams>,
) -> AppResult<Response> {
    let filter = scoped_filter(&state, &auth, &params).await?;
    let rows = ReadingRepo::export(&state.pool, &filter).await?;

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: params.project_id,
            details: Some(serde_json::json!({ "records": rows.len() })),
            ..audit::entry(&client, Some(auth.user_id), actions::EXPORT, resources::SENSOR_DATA)
        },
    );
    tracing::info!(user_id = auth.user_id, rows = rows.len(), "Sensor data exported");

    let filename = format!(
        "sensor_data_export_{}.csv",
        chrono::Utc::now().format("%Y%m%d%H%M%S")
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(axum::body::Body::from(render_csv(&rows)))
        .map(IntoResponse::into_response)
        .map_err(|e| AppError::InternalError(format!("Failed to build CSV response: {e}")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Apply the caller's project visibility to the request filter.
///
/// An explicit project must be accessible (403 otherwise); without one,
/// non-superadmins are limited to their own projects.
async fn scoped_filter(
    state: &AppState,
    auth: &AuthUser,
    params: &SensorDataParams,
) -> AppResult<ReadingQuery> {
    let mut filter = params.filter();
    if let Some(project_id) = params.project_id {
        ensure_project_access(&state.pool, auth, project_id).await?;
    } else {
        filter.accessible_projects = accessible_projects(&state.pool, auth).await?;
    }
    Ok(filter)
}

/// Projects to read recent data from. `None` means unrestricted.
///
/// Requested ids are intersected with what the caller may see.
fn recent_scope(requested: Vec<DbId>, accessible: Option<Vec<DbId>>) -> Option<Vec<DbId>> {
    match (requested.is_empty(), accessible) {
        (true, scope) => scope,
        (false, None) => Some(requested),
        (false, Some(allowed)) => Some(
            requested
                .into_iter()
                .filter(|id| allowed.contains(id))
                .collect(),
        ),
    }
}

/// Render export rows as CSV under [`CSV_HEADER`].
pub fn render_csv(rows: &[ReadingExportRow]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');

    for r in rows {
        let line = [
            r.recorded_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            csv_field(&r.project_name),
            csv_field(&r.device_name),
            csv_field(&r.device_key),
            csv_field(&r.sensor_type),
            r.value.to_string(),
            csv_field(&r.unit),
            r.is_alert.to_string(),
        ]
        .join(",");
        csv.push_str(&line);
        csv.push('\n');
    }

    csv
}

/// Quote a field containing a comma, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
