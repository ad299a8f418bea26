//! Classified sensor reading models.
//!
//! Readings are immutable once written.

use aquamon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `readings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reading {
    pub id: DbId,
    pub device_id: DbId,
    pub project_id: DbId,
    pub sensor_type: String,
    pub value: f64,
    pub unit: String,
    pub is_alert: bool,
    /// One of `normal`, `warning`, `critical`.
    pub alert_level: String,
    pub alert_message: Option<String>,
    pub recorded_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for inserting a classified reading.
#[derive(Debug, Clone)]
pub struct CreateReading {
    pub device_id: DbId,
    pub project_id: DbId,
    pub sensor_type: String,
    pub value: f64,
    pub unit: String,
    pub is_alert: bool,
    pub alert_level: String,
    pub alert_message: Option<String>,
    /// Defaults to `NOW()` when absent.
    pub recorded_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filter for listing and exporting readings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadingQuery {
    pub project_id: Option<DbId>,
    pub device_id: Option<DbId>,
    pub sensor_type: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub alerts_only: Option<bool>,
    /// Restricts results to these projects. `None` means unrestricted;
    /// an empty list matches nothing. Set by the caller's access rules,
    /// never from the query string.
    #[serde(skip)]
    pub accessible_projects: Option<Vec<DbId>>,
}

// ---------------------------------------------------------------------------
// Export row
// ---------------------------------------------------------------------------

/// A reading joined with its project and device names, for CSV export.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReadingExportRow {
    pub recorded_at: Timestamp,
    pub project_name: String,
    pub device_name: String,
    pub device_key: String,
    pub sensor_type: String,
    pub value: f64,
    pub unit: String,
    pub is_alert: bool,
    pub alert_level: String,
}
