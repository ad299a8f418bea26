//! Repository for the `readings` table.

use aquamon_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::reading::{CreateReading, Reading, ReadingExportRow, ReadingQuery};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, device_id, project_id, sensor_type, value, unit, is_alert, \
                       alert_level, alert_message, recorded_at, created_at";

/// Hard cap on rows returned by a single export.
pub const EXPORT_ROW_LIMIT: i64 = 10_000;

fn insert_query() -> String {
    format!(
        "INSERT INTO readings
            (device_id, project_id, sensor_type, value, unit,
             is_alert, alert_level, alert_message, recorded_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, NOW()))
         RETURNING {COLUMNS}"
    )
}

/// Provides insert and query operations for readings.
pub struct ReadingRepo;

impl ReadingRepo {
    /// Insert a classified reading.
    pub async fn create(pool: &PgPool, input: &CreateReading) -> Result<Reading, sqlx::Error> {
        sqlx::query_as::<_, Reading>(&insert_query())
            .bind(input.device_id)
            .bind(input.project_id)
            .bind(&input.sensor_type)
            .bind(input.value)
            .bind(&input.unit)
            .bind(input.is_alert)
            .bind(&input.alert_level)
            .bind(&input.alert_message)
            .bind(input.recorded_at)
            .fetch_one(pool)
            .await
    }

    /// Insert a batch of classified readings within a transaction.
    ///
    /// Either every row is stored or none is.
    pub async fn create_batch(
        pool: &PgPool,
        inputs: &[CreateReading],
    ) -> Result<Vec<Reading>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut results = Vec::with_capacity(inputs.len());
        let query = insert_query();

        for input in inputs {
            let row = sqlx::query_as::<_, Reading>(&query)
                .bind(input.device_id)
                .bind(input.project_id)
                .bind(&input.sensor_type)
                .bind(input.value)
                .bind(&input.unit)
                .bind(input.is_alert)
                .bind(&input.alert_level)
                .bind(&input.alert_message)
                .bind(input.recorded_at)
                .fetch_one(&mut *tx)
                .await?;
            results.push(row);
        }

        tx.commit().await?;
        Ok(results)
    }

    /// List readings matching `params`, newest first.
    pub async fn list(
        pool: &PgPool,
        params: &ReadingQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Reading>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_reading_filter(params, "");

        let query = format!(
            "SELECT {COLUMNS} FROM readings {where_clause} \
             ORDER BY recorded_at DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let q = bind_reading_values(sqlx::query_as::<_, Reading>(&query), &bind_values);
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count readings matching `params` (for pagination metadata).
    pub async fn count(pool: &PgPool, params: &ReadingQuery) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_reading_filter(params, "");

        let query = format!("SELECT COUNT(*)::BIGINT AS count FROM readings {where_clause}");

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for val in &bind_values {
            q = match val {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::BigIntArray(v) => q.bind(v.as_slice()),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q.fetch_one(pool).await
    }

    /// Most recent readings across the given projects (all projects when
    /// `project_ids` is `None`).
    pub async fn recent(
        pool: &PgPool,
        project_ids: Option<&[DbId]>,
        limit: i64,
    ) -> Result<Vec<Reading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM readings
             WHERE ($1::BIGINT[] IS NULL OR project_id = ANY($1))
             ORDER BY recorded_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, Reading>(&query)
            .bind(project_ids)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Readings joined with project and device names, newest first, capped
    /// at [`EXPORT_ROW_LIMIT`].
    pub async fn export(
        pool: &PgPool,
        params: &ReadingQuery,
    ) -> Result<Vec<ReadingExportRow>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_reading_filter(params, "r.");

        let query = format!(
            "SELECT r.recorded_at, COALESCE(p.name, '') AS project_name, \
                    COALESCE(d.name, '') AS device_name, COALESCE(d.device_key, '') AS device_key, \
                    r.sensor_type, r.value, r.unit, r.is_alert, r.alert_level \
             FROM readings r \
             LEFT JOIN projects p ON p.id = r.project_id \
             LEFT JOIN devices d ON d.id = r.device_id \
             {where_clause} \
             ORDER BY r.recorded_at DESC, r.id DESC \
             LIMIT ${bind_idx}"
        );

        let q = bind_reading_values(sqlx::query_as::<_, ReadingExportRow>(&query), &bind_values);
        q.bind(EXPORT_ROW_LIMIT).fetch_all(pool).await
    }

    /// Latest reading per sensor type for a device.
    pub async fn latest_for_device(
        pool: &PgPool,
        device_id: DbId,
    ) -> Result<Vec<Reading>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT ON (sensor_type) {COLUMNS}
             FROM readings
             WHERE device_id = $1
             ORDER BY sensor_type, recorded_at DESC"
        );
        sqlx::query_as::<_, Reading>(&query)
            .bind(device_id)
            .fetch_all(pool)
            .await
    }
}

// ---------------------------------------------------------------------------
// Dynamic filter helpers
// ---------------------------------------------------------------------------

/// A typed bind value for dynamic queries.
enum BindValue {
    BigInt(DbId),
    BigIntArray(Vec<DbId>),
    Text(String),
    Timestamp(Timestamp),
}

/// Build a WHERE clause from the filter. `alias` prefixes every column
/// (e.g. `"r."` when the query joins other tables).
///
/// Returns the clause, the values to bind in order, and the next free
/// placeholder index.
fn build_reading_filter(params: &ReadingQuery, alias: &str) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(ref projects) = params.accessible_projects {
        conditions.push(format!("{alias}project_id = ANY(${bind_idx})"));
        bind_idx += 1;
        bind_values.push(BindValue::BigIntArray(projects.clone()));
    }

    if let Some(project_id) = params.project_id {
        conditions.push(format!("{alias}project_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(project_id));
    }

    if let Some(device_id) = params.device_id {
        conditions.push(format!("{alias}device_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(device_id));
    }

    if let Some(ref sensor_type) = params.sensor_type {
        conditions.push(format!("{alias}sensor_type = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(sensor_type.clone()));
    }

    if let Some(from) = params.from {
        conditions.push(format!("{alias}recorded_at >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(from));
    }

    if let Some(to) = params.to {
        conditions.push(format!("{alias}recorded_at <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(to));
    }

    if params.alerts_only.unwrap_or(false) {
        conditions.push(format!("{alias}is_alert"));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_reading_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        q = match val {
            BindValue::BigInt(v) => q.bind(*v),
            BindValue::BigIntArray(v) => q.bind(v.as_slice()),
            BindValue::Text(v) => q.bind(v.as_str()),
            BindValue::Timestamp(v) => q.bind(*v),
        };
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_has_no_where_clause() {
        let (clause, values, next) = build_reading_filter(&ReadingQuery::default(), "");
        assert!(clause.is_empty());
        assert!(values.is_empty());
        assert_eq!(next, 1);
    }

    #[test]
    fn filter_numbers_placeholders_in_order() {
        let params = ReadingQuery {
            accessible_projects: Some(vec![1, 2]),
            device_id: Some(9),
            sensor_type: Some("pH".to_string()),
            alerts_only: Some(true),
            ..Default::default()
        };
        let (clause, values, next) = build_reading_filter(&params, "r.");
        assert_eq!(
            clause,
            "WHERE r.project_id = ANY($1) AND r.device_id = $2 AND r.sensor_type = $3 AND r.is_alert"
        );
        assert_eq!(values.len(), 3);
        assert_eq!(next, 4);
    }
}
