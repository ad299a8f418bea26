//! Postgres-backed [`ThresholdStore`] for the resolver.

use aquamon_core::resolver::{StoredThreshold, ThresholdStore};
use aquamon_core::sensor::SensorType;
use aquamon_core::types::DbId;
use async_trait::async_trait;

use crate::repositories::SensorThresholdRepo;
use crate::DbPool;

/// Resolves thresholds against the `sensor_thresholds` table.
#[derive(Debug, Clone)]
pub struct PgThresholdStore {
    pool: DbPool,
}

impl PgThresholdStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThresholdStore for PgThresholdStore {
    type Error = sqlx::Error;

    async fn find_for_device(
        &self,
        sensor_type: SensorType,
        device_id: DbId,
    ) -> Result<Option<StoredThreshold>, sqlx::Error> {
        let row =
            SensorThresholdRepo::find_for_device(&self.pool, sensor_type.as_str(), device_id)
                .await?;
        Ok(row.map(Into::into))
    }

    async fn find_for_project(
        &self,
        sensor_type: SensorType,
        project_id: DbId,
    ) -> Result<Option<StoredThreshold>, sqlx::Error> {
        let row =
            SensorThresholdRepo::find_for_project(&self.pool, sensor_type.as_str(), project_id)
                .await?;
        Ok(row.map(Into::into))
    }

    async fn find_global_default(
        &self,
        sensor_type: SensorType,
    ) -> Result<Option<StoredThreshold>, sqlx::Error> {
        let row = SensorThresholdRepo::find_global_default(&self.pool, sensor_type.as_str()).await?;
        Ok(row.map(Into::into))
    }
}
