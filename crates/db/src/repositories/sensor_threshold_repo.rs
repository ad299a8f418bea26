//! Repository for the `sensor_thresholds` table.

use aquamon_core::types::DbId;
use sqlx::PgPool;

use crate::models::sensor_threshold::{SensorThreshold, UpsertSensorThreshold};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, sensor_type, device_id, project_id, is_default, \
                       ideal_min, ideal_max, warning_min, warning_max, \
                       critical_min, critical_max, unit, created_by, created_at, updated_at";

/// SET clause applied when an upsert hits an existing row.
const UPSERT_SET: &str = "ideal_min = EXCLUDED.ideal_min,
                    ideal_max = EXCLUDED.ideal_max,
                    warning_min = EXCLUDED.warning_min,
                    warning_max = EXCLUDED.warning_max,
                    critical_min = EXCLUDED.critical_min,
                    critical_max = EXCLUDED.critical_max,
                    unit = EXCLUDED.unit,
                    created_by = EXCLUDED.created_by,
                    updated_at = NOW()";

/// Provides scoped lookups and upserts for sensor thresholds.
pub struct SensorThresholdRepo;

impl SensorThresholdRepo {
    // -----------------------------------------------------------------------
    // Point lookups (one per override scope)
    // -----------------------------------------------------------------------

    /// Threshold bound to a device for one sensor type.
    pub async fn find_for_device(
        pool: &PgPool,
        sensor_type: &str,
        device_id: DbId,
    ) -> Result<Option<SensorThreshold>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sensor_thresholds
             WHERE device_id = $1 AND sensor_type = $2"
        );
        sqlx::query_as::<_, SensorThreshold>(&query)
            .bind(device_id)
            .bind(sensor_type)
            .fetch_optional(pool)
            .await
    }

    /// Threshold bound to a project (and no device) for one sensor type.
    pub async fn find_for_project(
        pool: &PgPool,
        sensor_type: &str,
        project_id: DbId,
    ) -> Result<Option<SensorThreshold>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sensor_thresholds
             WHERE project_id = $1 AND device_id IS NULL AND sensor_type = $2"
        );
        sqlx::query_as::<_, SensorThreshold>(&query)
            .bind(project_id)
            .bind(sensor_type)
            .fetch_optional(pool)
            .await
    }

    /// Global default for one sensor type.
    pub async fn find_global_default(
        pool: &PgPool,
        sensor_type: &str,
    ) -> Result<Option<SensorThreshold>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sensor_thresholds
             WHERE is_default AND device_id IS NULL AND project_id IS NULL
               AND sensor_type = $1"
        );
        sqlx::query_as::<_, SensorThreshold>(&query)
            .bind(sensor_type)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SensorThreshold>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sensor_thresholds WHERE id = $1");
        sqlx::query_as::<_, SensorThreshold>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Listings
    // -----------------------------------------------------------------------

    /// All global defaults, ordered by sensor type.
    pub async fn list_global_defaults(pool: &PgPool) -> Result<Vec<SensorThreshold>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sensor_thresholds
             WHERE is_default
             ORDER BY sensor_type"
        );
        sqlx::query_as::<_, SensorThreshold>(&query)
            .fetch_all(pool)
            .await
    }

    /// Effective thresholds for a project.
    ///
    /// For each sensor type the project override wins; otherwise the global
    /// default is returned. Types with neither are absent.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<SensorThreshold>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT ON (sensor_type)
                {COLUMNS}
             FROM sensor_thresholds
             WHERE (project_id = $1 AND device_id IS NULL) OR is_default
             ORDER BY sensor_type, is_default ASC"
        );
        sqlx::query_as::<_, SensorThreshold>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Effective thresholds for a device: device override, then its
    /// project's override, then the global default.
    pub async fn list_for_device(
        pool: &PgPool,
        device_id: DbId,
    ) -> Result<Vec<SensorThreshold>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT ON (sensor_type)
                {COLUMNS}
             FROM sensor_thresholds
             WHERE device_id = $1
                OR (device_id IS NULL
                    AND project_id = (SELECT project_id FROM devices WHERE id = $1))
                OR is_default
             ORDER BY sensor_type,
                      CASE WHEN device_id IS NOT NULL THEN 0
                           WHEN project_id IS NOT NULL THEN 1
                           ELSE 2 END"
        );
        sqlx::query_as::<_, SensorThreshold>(&query)
            .bind(device_id)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Create or replace the global default for `body.sensor_type`.
    pub async fn upsert_global(
        pool: &PgPool,
        body: &UpsertSensorThreshold,
        created_by: Option<DbId>,
    ) -> Result<SensorThreshold, sqlx::Error> {
        let query = format!(
            "INSERT INTO sensor_thresholds
                (sensor_type, device_id, project_id, is_default,
                 ideal_min, ideal_max, warning_min, warning_max,
                 critical_min, critical_max, unit, created_by)
             VALUES ($1, NULL, NULL, TRUE, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (sensor_type) WHERE is_default
             DO UPDATE SET {UPSERT_SET}
             RETURNING {COLUMNS}"
        );
        bind_body(sqlx::query_as::<_, SensorThreshold>(&query), body)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Create or replace a project-level override.
    pub async fn upsert_for_project(
        pool: &PgPool,
        project_id: DbId,
        body: &UpsertSensorThreshold,
        created_by: Option<DbId>,
    ) -> Result<SensorThreshold, sqlx::Error> {
        let query = format!(
            "INSERT INTO sensor_thresholds
                (sensor_type, ideal_min, ideal_max, warning_min, warning_max,
                 critical_min, critical_max, unit, created_by, project_id, device_id, is_default)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NULL, FALSE)
             ON CONFLICT (project_id, sensor_type) WHERE project_id IS NOT NULL
             DO UPDATE SET {UPSERT_SET}
             RETURNING {COLUMNS}"
        );
        bind_body(sqlx::query_as::<_, SensorThreshold>(&query), body)
            .bind(created_by)
            .bind(project_id)
            .fetch_one(pool)
            .await
    }

    /// Create or replace a device-level override.
    pub async fn upsert_for_device(
        pool: &PgPool,
        device_id: DbId,
        body: &UpsertSensorThreshold,
        created_by: Option<DbId>,
    ) -> Result<SensorThreshold, sqlx::Error> {
        let query = format!(
            "INSERT INTO sensor_thresholds
                (sensor_type, ideal_min, ideal_max, warning_min, warning_max,
                 critical_min, critical_max, unit, created_by, device_id, project_id, is_default)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NULL, FALSE)
             ON CONFLICT (device_id, sensor_type) WHERE device_id IS NOT NULL
             DO UPDATE SET {UPSERT_SET}
             RETURNING {COLUMNS}"
        );
        bind_body(sqlx::query_as::<_, SensorThreshold>(&query), body)
            .bind(created_by)
            .bind(device_id)
            .fetch_one(pool)
            .await
    }

    /// Insert a global default only if none exists for its sensor type.
    ///
    /// Returns `true` when a row was inserted.
    pub async fn insert_global_if_missing(
        pool: &PgPool,
        body: &UpsertSensorThreshold,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO sensor_thresholds
                (sensor_type, device_id, project_id, is_default,
                 ideal_min, ideal_max, warning_min, warning_max,
                 critical_min, critical_max, unit)
             VALUES ($1, NULL, NULL, TRUE, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (sensor_type) WHERE is_default DO NOTHING",
        )
        .bind(&body.sensor_type)
        .bind(body.ideal_min)
        .bind(body.ideal_max)
        .bind(body.warning_min)
        .bind(body.warning_max)
        .bind(body.critical_min)
        .bind(body.critical_max)
        .bind(&body.unit)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete global defaults whose sensor type is not in `keep`.
    ///
    /// Returns the number of rows removed.
    pub async fn delete_globals_except(pool: &PgPool, keep: &[String]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM sensor_thresholds
             WHERE is_default AND NOT (sensor_type = ANY($1))",
        )
        .bind(keep)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete a threshold by id. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sensor_thresholds WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Bind the eight body columns in `$1..$8` order.
fn bind_body<'q>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, SensorThreshold, sqlx::postgres::PgArguments>,
    body: &'q UpsertSensorThreshold,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, SensorThreshold, sqlx::postgres::PgArguments> {
    q.bind(&body.sensor_type)
        .bind(body.ideal_min)
        .bind(body.ideal_max)
        .bind(body.warning_min)
        .bind(body.warning_max)
        .bind(body.critical_min)
        .bind(body.critical_max)
        .bind(&body.unit)
}
