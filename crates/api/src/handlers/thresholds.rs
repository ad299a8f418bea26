//! Handlers for the `/thresholds` resource.
//!
//! Thresholds live at three scopes: global defaults, project overrides and
//! device overrides. Listing views merge the scopes the same way the
//! resolver does; the resolve endpoint previews what ingest would apply.

use aquamon_core::audit::{actions, resources};
use aquamon_core::error::CoreError;
use aquamon_core::threshold::{ResolvedThreshold, ThresholdSource};
use aquamon_core::types::DbId;
use aquamon_db::models::audit::CreateAuditLog;
use aquamon_db::models::sensor_threshold::{SensorThreshold, UpsertSensorThreshold};
use aquamon_db::repositories::{DeviceRepo, SensorThresholdRepo};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::access::{ensure_project_access, ensure_project_admin, load_project};
use crate::audit;
use crate::error::{AppError, AppResult};
use crate::handlers::devices::load_device;
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::{RequireAdmin, RequireSuperAdmin};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    pub sensor_type: String,
    pub device_id: Option<DbId>,
    /// Defaults to the device's project when only `device_id` is given.
    pub project_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// GET /api/v1/thresholds/defaults
pub async fn list_defaults(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<SensorThreshold>>>> {
    let rows = SensorThresholdRepo::list_global_defaults(&state.pool).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/thresholds/projects/{project_id}
///
/// Project overrides, with global defaults filling the missing types.
pub async fn list_for_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<SensorThreshold>>>> {
    load_project(&state.pool, project_id).await?;
    ensure_project_access(&state.pool, &auth, project_id).await?;
    let rows = SensorThresholdRepo::list_for_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/thresholds/devices/{device_id}
///
/// Device overrides, then the owning project's overrides, then defaults.
pub async fn list_for_device(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(device_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<SensorThreshold>>>> {
    let device = load_device(&state.pool, device_id).await?;
    ensure_project_access(&state.pool, &auth, device.project_id).await?;
    let rows = SensorThresholdRepo::list_for_device(&state.pool, device_id).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/thresholds/resolve?sensor_type=&device_id=&project_id=
///
/// The threshold ingest would apply, with the scope it came from.
pub async fn resolve(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ResolveParams>,
) -> AppResult<Json<DataResponse<ResolvedThreshold>>> {
    let mut project_id = params.project_id;

    if let Some(device_id) = params.device_id {
        let device = load_device(&state.pool, device_id).await?;
        match project_id {
            Some(pid) if pid != device.project_id => {
                return Err(AppError::BadRequest(format!(
                    "Device {device_id} does not belong to project {pid}"
                )));
            }
            _ => project_id = Some(device.project_id),
        }
    }
    if let Some(pid) = project_id {
        ensure_project_access(&state.pool, &auth, pid).await?;
    }

    let resolved = state
        .resolver
        .resolve(&params.sensor_type, params.device_id, project_id)
        .await?;

    if resolved.source == ThresholdSource::Generic {
        tracing::warn!(
            sensor_type = %params.sensor_type,
            "No threshold configured for sensor type, using generic range"
        );
    }

    Ok(Json(DataResponse { data: resolved }))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// PUT /api/v1/thresholds/defaults
///
/// Create or replace the global default for the body's sensor type.
pub async fn upsert_default(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    client: ClientInfo,
    Json(input): Json<UpsertSensorThreshold>,
) -> AppResult<Json<DataResponse<SensorThreshold>>> {
    input.bounds().validate()?;

    let row = SensorThresholdRepo::upsert_global(&state.pool, &input, Some(admin.user_id)).await?;

    record_write(&state, &client, admin.user_id, &row);
    Ok(Json(DataResponse { data: row }))
}

/// PUT /api/v1/thresholds/projects/{project_id}
pub async fn upsert_for_project(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(project_id): Path<DbId>,
    Json(input): Json<UpsertSensorThreshold>,
) -> AppResult<Json<DataResponse<SensorThreshold>>> {
    ensure_project_admin(&state.pool, &admin, project_id).await?;
    input.bounds().validate()?;

    let row = SensorThresholdRepo::upsert_for_project(
        &state.pool,
        project_id,
        &input,
        Some(admin.user_id),
    )
    .await?;

    record_write(&state, &client, admin.user_id, &row);
    Ok(Json(DataResponse { data: row }))
}

/// PUT /api/v1/thresholds/devices/{device_id}
pub async fn upsert_for_device(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(device_id): Path<DbId>,
    Json(input): Json<UpsertSensorThreshold>,
) -> AppResult<Json<DataResponse<SensorThreshold>>> {
    let device = load_device(&state.pool, device_id).await?;
    ensure_project_admin(&state.pool, &admin, device.project_id).await?;
    input.bounds().validate()?;

    let row =
        SensorThresholdRepo::upsert_for_device(&state.pool, device_id, &input, Some(admin.user_id))
            .await?;

    record_write(&state, &client, admin.user_id, &row);
    Ok(Json(DataResponse { data: row }))
}

/// DELETE /api/v1/thresholds/{id}
///
/// Global defaults may only be deleted by a superadmin. Overrides need the
/// admin of the project they belong to; an override whose device no longer
/// exists is superadmin-only.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let row = SensorThresholdRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Threshold",
            id,
        }))?;

    let owning_project = match (row.project_id, row.device_id) {
        (Some(project_id), _) => Some(project_id),
        (None, Some(device_id)) => DeviceRepo::find_by_id(&state.pool, device_id)
            .await?
            .map(|d| d.project_id),
        (None, None) => None,
    };

    match owning_project {
        Some(project_id) if !admin.is_superadmin() => {
            ensure_project_admin(&state.pool, &admin, project_id).await?;
        }
        None if !admin.is_superadmin() => {
            return Err(AppError::Core(CoreError::Forbidden(
                "Only a superadmin can delete this threshold".into(),
            )));
        }
        _ => {}
    }

    SensorThresholdRepo::delete(&state.pool, id).await?;

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(id),
            details: Some(serde_json::json!({ "sensor_type": row.sensor_type })),
            ..audit::entry(&client, Some(admin.user_id), actions::DELETE, resources::THRESHOLD)
        },
    );

    Ok(StatusCode::NO_CONTENT)
}

fn record_write(state: &AppState, client: &ClientInfo, user_id: DbId, row: &SensorThreshold) {
    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(row.id),
            details: Some(serde_json::json!({
                "sensor_type": row.sensor_type,
                "device_id": row.device_id,
                "project_id": row.project_id,
                "is_default": row.is_default,
            })),
            ..audit::entry(client, Some(user_id), actions::UPDATE, resources::THRESHOLD)
        },
    );
    tracing::info!(
        threshold_id = row.id,
        sensor_type = %row.sensor_type,
        "Threshold saved"
    );
}
