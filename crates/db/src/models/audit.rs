//! Audit log entity and DTOs.
//!
//! Entries are append-only; there is no `updated_at`.

use aquamon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single audit log entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting an audit log entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAuditLog {
    pub user_id: Option<DbId>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
