//! Sensor threshold models and DTOs.
//!
//! Maps to the `sensor_thresholds` table. A row is scoped to exactly one of
//! a device, a project, or the global defaults (`is_default`), enforced by
//! `ck_sensor_thresholds_scope`.

use aquamon_core::resolver::StoredThreshold;
use aquamon_core::threshold::ThresholdBounds;
use aquamon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `sensor_thresholds` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SensorThreshold {
    pub id: DbId,
    pub sensor_type: String,
    pub device_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub is_default: bool,
    pub ideal_min: f64,
    pub ideal_max: f64,
    pub warning_min: f64,
    pub warning_max: f64,
    pub critical_min: f64,
    pub critical_max: f64,
    pub unit: String,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SensorThreshold {
    pub fn bounds(&self) -> ThresholdBounds {
        ThresholdBounds {
            sensor_type: self.sensor_type.clone(),
            ideal_min: self.ideal_min,
            ideal_max: self.ideal_max,
            warning_min: self.warning_min,
            warning_max: self.warning_max,
            critical_min: self.critical_min,
            critical_max: self.critical_max,
            unit: self.unit.clone(),
        }
    }
}

impl From<SensorThreshold> for StoredThreshold {
    fn from(row: SensorThreshold) -> Self {
        let bounds = row.bounds();
        StoredThreshold { id: row.id, bounds }
    }
}

// ---------------------------------------------------------------------------
// Upsert DTO
// ---------------------------------------------------------------------------

/// DTO for creating or replacing a threshold at any scope.
///
/// The scope itself comes from the route, not the body.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertSensorThreshold {
    pub sensor_type: String,
    pub ideal_min: f64,
    pub ideal_max: f64,
    pub warning_min: f64,
    pub warning_max: f64,
    pub critical_min: f64,
    pub critical_max: f64,
    pub unit: String,
}

impl UpsertSensorThreshold {
    pub fn bounds(&self) -> ThresholdBounds {
        ThresholdBounds {
            sensor_type: self.sensor_type.clone(),
            ideal_min: self.ideal_min,
            ideal_max: self.ideal_max,
            warning_min: self.warning_min,
            warning_max: self.warning_max,
            critical_min: self.critical_min,
            critical_max: self.critical_max,
            unit: self.unit.clone(),
        }
    }
}

impl From<&ThresholdBounds> for UpsertSensorThreshold {
    fn from(b: &ThresholdBounds) -> Self {
        Self {
            sensor_type: b.sensor_type.clone(),
            ideal_min: b.ideal_min,
            ideal_max: b.ideal_max,
            warning_min: b.warning_min,
            warning_max: b.warning_max,
            critical_min: b.critical_min,
            critical_max: b.critical_max,
            unit: b.unit.clone(),
        }
    }
}
