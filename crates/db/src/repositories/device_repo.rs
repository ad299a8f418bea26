//! Repository for the `devices` table.

use aquamon_core::types::DbId;
use sqlx::PgPool;

use crate::models::device::{CreateDevice, Device, UpdateDevice, STATUS_OFFLINE, STATUS_ONLINE};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, device_key, project_id, description, location, sensor_types, \
                       status, last_seen_at, is_active, created_at, updated_at";

/// Provides CRUD operations for devices.
pub struct DeviceRepo;

impl DeviceRepo {
    /// Insert a new device, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateDevice) -> Result<Device, sqlx::Error> {
        let query = format!(
            "INSERT INTO devices
                (name, device_key, project_id, description, location, sensor_types, status)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, '{STATUS_OFFLINE}'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(&input.name)
            .bind(&input.device_key)
            .bind(input.project_id)
            .bind(&input.description)
            .bind(&input.location)
            .bind(&input.sensor_types)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Device>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices WHERE id = $1");
        sqlx::query_as::<_, Device>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a device by the external key it reports with.
    pub async fn find_by_key(
        pool: &PgPool,
        device_key: &str,
    ) -> Result<Option<Device>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices WHERE device_key = $1");
        sqlx::query_as::<_, Device>(&query)
            .bind(device_key)
            .fetch_optional(pool)
            .await
    }

    /// List devices, optionally restricted to a set of projects.
    pub async fn list(
        pool: &PgPool,
        project_ids: Option<&[DbId]>,
    ) -> Result<Vec<Device>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM devices
             WHERE ($1::BIGINT[] IS NULL OR project_id = ANY($1))
             ORDER BY project_id, name"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(project_ids)
            .fetch_all(pool)
            .await
    }

    /// Update a device. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDevice,
    ) -> Result<Option<Device>, sqlx::Error> {
        let query = format!(
            "UPDATE devices SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                sensor_types = COALESCE($5, sensor_types),
                status = COALESCE($6, status),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.location)
            .bind(&input.sensor_types)
            .bind(&input.status)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Mark a device online and stamp `last_seen_at`.
    pub async fn mark_seen(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE devices SET status = $2, last_seen_at = NOW(), updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(STATUS_ONLINE)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Delete a device. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
