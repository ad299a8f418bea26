//! Device entity model and DTOs.

use aquamon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const STATUS_ONLINE: &str = "online";
pub const STATUS_OFFLINE: &str = "offline";
pub const STATUS_MAINTENANCE: &str = "maintenance";

/// Valid values for `devices.status`.
pub const ALL_STATUSES: [&str; 3] = [STATUS_ONLINE, STATUS_OFFLINE, STATUS_MAINTENANCE];

/// A row from the `devices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Device {
    pub id: DbId,
    pub name: String,
    /// External identifier the field hardware reports with.
    pub device_key: String,
    pub project_id: DbId,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Sensor type names this device is registered to report.
    pub sensor_types: Vec<String>,
    pub status: String,
    pub last_seen_at: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Device {
    pub fn reports(&self, sensor_type: &str) -> bool {
        self.sensor_types.iter().any(|t| t == sensor_type)
    }
}

/// DTO for registering a device.
#[derive(Debug, Deserialize)]
pub struct CreateDevice {
    pub name: String,
    pub device_key: String,
    pub project_id: DbId,
    pub description: Option<String>,
    pub location: Option<String>,
    pub sensor_types: Vec<String>,
    pub status: Option<String>,
}

/// DTO for updating a device. All fields are optional; the owning project
/// cannot be changed.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateDevice {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub sensor_types: Option<Vec<String>>,
    pub status: Option<String>,
    pub is_active: Option<bool>,
}
