//! Handlers for the `/devices` resource.

use aquamon_core::audit::{actions, resources};
use aquamon_core::error::CoreError;
use aquamon_core::sensor::parse_sensor_types;
use aquamon_core::types::DbId;
use aquamon_db::models::audit::CreateAuditLog;
use aquamon_db::models::device::{CreateDevice, Device, UpdateDevice, ALL_STATUSES};
use aquamon_db::models::reading::Reading;
use aquamon_db::repositories::{DeviceRepo, ReadingRepo};
use aquamon_db::DbPool;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::access::{accessible_projects, ensure_project_access, ensure_project_admin};
use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeviceListParams {
    pub project_id: Option<DbId>,
}

/// A device with its most recent reading per sensor type.
#[derive(Debug, Serialize)]
pub struct DeviceDetail {
    #[serde(flatten)]
    pub device: Device,
    pub latest_readings: Vec<Reading>,
}

/// GET /api/v1/devices
///
/// Devices in the caller's projects, optionally narrowed to one project.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<DeviceListParams>,
) -> AppResult<Json<DataResponse<Vec<Device>>>> {
    let devices = match params.project_id {
        Some(project_id) => {
            ensure_project_access(&state.pool, &auth, project_id).await?;
            DeviceRepo::list(&state.pool, Some(&[project_id])).await?
        }
        None => {
            let scope = accessible_projects(&state.pool, &auth).await?;
            DeviceRepo::list(&state.pool, scope.as_deref()).await?
        }
    };
    Ok(Json(DataResponse { data: devices }))
}

/// GET /api/v1/devices/{id}
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DeviceDetail>>> {
    let device = load_device(&state.pool, id).await?;
    ensure_project_access(&state.pool, &auth, device.project_id).await?;
    let latest_readings = ReadingRepo::latest_for_device(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: DeviceDetail {
            device,
            latest_readings,
        },
    }))
}

/// POST /api/v1/devices
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Json(input): Json<CreateDevice>,
) -> AppResult<(StatusCode, Json<DataResponse<Device>>)> {
    if input.name.trim().is_empty() || input.device_key.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name and device_key are required".into(),
        )));
    }
    validate_device_fields(Some(input.sensor_types.as_slice()), input.status.as_deref())?;
    ensure_project_admin(&state.pool, &admin, input.project_id).await?;

    let device = DeviceRepo::create(&state.pool, &input).await?;

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(device.id),
            ..audit::entry(&client, Some(admin.user_id), actions::CREATE, resources::DEVICE)
        },
    );
    tracing::info!(
        device_id = device.id,
        device_key = %device.device_key,
        project_id = device.project_id,
        "Device registered"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: device })))
}

/// PUT /api/v1/devices/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDevice>,
) -> AppResult<Json<DataResponse<Device>>> {
    let device = load_device(&state.pool, id).await?;
    ensure_project_admin(&state.pool, &admin, device.project_id).await?;
    validate_device_fields(input.sensor_types.as_deref(), input.status.as_deref())?;

    let device = DeviceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Device",
            id,
        }))?;

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(id),
            ..audit::entry(&client, Some(admin.user_id), actions::UPDATE, resources::DEVICE)
        },
    );

    Ok(Json(DataResponse { data: device }))
}

/// DELETE /api/v1/devices/{id}
///
/// Stored readings and device-scoped thresholds are left in place.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let device = load_device(&state.pool, id).await?;
    ensure_project_admin(&state.pool, &admin, device.project_id).await?;

    DeviceRepo::delete(&state.pool, id).await?;

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(id),
            ..audit::entry(&client, Some(admin.user_id), actions::DELETE, resources::DEVICE)
        },
    );
    tracing::info!(device_id = id, "Device deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn load_device(pool: &DbPool, id: DbId) -> AppResult<Device> {
    DeviceRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Device",
            id,
        }))
}

/// Registered sensor types must all be known; status must be one of the
/// allowed values.
fn validate_device_fields(
    sensor_types: Option<&[String]>,
    status: Option<&str>,
) -> AppResult<()> {
    if let Some(types) = sensor_types {
        parse_sensor_types(types)?;
    }
    if let Some(status) = status {
        if !ALL_STATUSES.contains(&status) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid status '{status}'. Expected one of: {}",
                ALL_STATUSES.join(", ")
            ))));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn known_sensor_types_and_status_pass() {
        let types = vec!["pH".to_string(), "dissolvedOxygen".to_string()];
        assert!(validate_device_fields(Some(types.as_slice()), Some("maintenance")).is_ok());
        assert!(validate_device_fields(None, None).is_ok());
    }

    #[test]
    fn unknown_sensor_type_is_rejected() {
        let types = vec!["ammonia".to_string()];
        assert_matches!(
            validate_device_fields(Some(types.as_slice()), None),
            Err(AppError::Core(CoreError::Validation(msg))) if msg.contains("ammonia")
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_matches!(
            validate_device_fields(None, Some("sleeping")),
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }
}
