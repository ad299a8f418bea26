//! Audit entries published from handlers.
//!
//! Entries go onto the event bus and are persisted by
//! [`aquamon_events::AuditWriter`], so a failed write never fails the
//! request that caused it.

use aquamon_core::types::DbId;
use aquamon_db::models::audit::CreateAuditLog;
use aquamon_events::audit_writer::audit_event;
use aquamon_events::EventBus;

use crate::middleware::client::ClientInfo;

/// Base entry for `action` on `resource_type`, carrying caller metadata.
///
/// Fill in `resource_id` and `details` with struct update syntax.
pub fn entry(
    client: &ClientInfo,
    user_id: Option<DbId>,
    action: &str,
    resource_type: &str,
) -> CreateAuditLog {
    CreateAuditLog {
        user_id,
        action: action.to_string(),
        resource_type: resource_type.to_string(),
        resource_id: None,
        details: None,
        ip_address: client.ip_address.clone(),
        user_agent: client.user_agent.clone(),
    }
}

/// Publish an audit entry.
pub fn record(bus: &EventBus, entry: CreateAuditLog) {
    tracing::debug!(
        action = %entry.action,
        resource_type = %entry.resource_type,
        user_id = ?entry.user_id,
        "Audit entry recorded"
    );
    bus.publish(audit_event(&entry));
}
