//! Global default threshold seeding.

use aquamon_core::threshold::FallbackTable;

use crate::models::sensor_threshold::UpsertSensorThreshold;
use crate::repositories::SensorThresholdRepo;
use crate::DbPool;

/// What a seeding pass changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub removed: u64,
}

/// Make the stored global defaults match `table`'s sensor types.
///
/// Missing defaults are inserted from the table; existing ones are left as
/// edited. Defaults for sensor types not in the table are deleted. Running
/// it twice changes nothing the second time.
pub async fn seed_default_thresholds(
    pool: &DbPool,
    table: &FallbackTable,
) -> Result<SeedReport, sqlx::Error> {
    let mut report = SeedReport::default();

    for bounds in table.iter() {
        let body = UpsertSensorThreshold::from(bounds);
        if SensorThresholdRepo::insert_global_if_missing(pool, &body).await? {
            tracing::info!(sensor_type = %body.sensor_type, "Seeded default threshold");
            report.inserted += 1;
        }
    }

    let keep: Vec<String> = table.iter().map(|b| b.sensor_type.clone()).collect();
    report.removed = SensorThresholdRepo::delete_globals_except(pool, &keep).await?;
    if report.removed > 0 {
        tracing::info!(removed = report.removed, "Removed stale default thresholds");
    }

    Ok(report)
}
