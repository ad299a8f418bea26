//! Repository for the `audit_logs` table.

use aquamon_core::types::DbId;
use sqlx::PgPool;

use crate::models::audit::{AuditLog, CreateAuditLog};

/// Column list for `audit_logs` SELECT queries.
const COLUMNS: &str = "\
    id, user_id, action, resource_type, resource_id, \
    details, ip_address, user_agent, created_at";

/// Provides insert and query operations for audit logs.
pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Append one entry.
    pub async fn create(pool: &PgPool, entry: &CreateAuditLog) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs
                (user_id, action, resource_type, resource_id, details, ip_address, user_agent)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(entry.user_id)
            .bind(&entry.action)
            .bind(&entry.resource_type)
            .bind(entry.resource_id)
            .bind(&entry.details)
            .bind(&entry.ip_address)
            .bind(&entry.user_agent)
            .fetch_one(pool)
            .await
    }

    /// Most recent entries for a user, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
