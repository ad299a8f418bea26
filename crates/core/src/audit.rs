//! Audit log action and resource type constants.
//!
//! These must match the `audit_logs_action_check` and
//! `audit_logs_resource_type_check` constraints in the initial migration.

/// Known action types for audit log entries.
pub mod actions {
    pub const LOGIN: &str = "login";
    pub const LOGOUT: &str = "logout";
    pub const VIEW: &str = "view";
    pub const EXPORT: &str = "export";
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    pub const API_ACCESS: &str = "api_access";
}

/// Known resource types for audit log entries.
pub mod resources {
    pub const USER: &str = "user";
    pub const PROJECT: &str = "project";
    pub const DEVICE: &str = "device";
    pub const SENSOR_DATA: &str = "sensorData";
    pub const THRESHOLD: &str = "threshold";
    pub const SYSTEM: &str = "system";
}
