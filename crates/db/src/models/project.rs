//! Project entity model and DTOs.
//!
//! A project groups devices and users. Its API key authenticates ingest;
//! only the key's SHA-256 digest and a short display prefix are stored.

use aquamon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub admin_id: DbId,
    #[serde(skip_serializing)]
    pub api_key_hash: String,
    pub api_key_prefix: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a project. The key hash and prefix come from
/// `aquamon_core::api_keys::generate_api_key`.
#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub admin_id: DbId,
    #[serde(skip)]
    pub api_key_hash: String,
    #[serde(skip)]
    pub api_key_prefix: String,
}

/// DTO for updating a project. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub admin_id: Option<DbId>,
    pub is_active: Option<bool>,
}

/// A project member as listed on the project detail view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectMember {
    pub user_id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub joined_at: Timestamp,
}
