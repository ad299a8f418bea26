//! Audit log persistence service.
//!
//! Handlers publish [`EVENT_AUDIT_RECORDED`] events instead of writing to
//! the database on the request path. [`AuditWriter`] subscribes to the bus
//! and inserts each one into `audit_logs`. Write failures are logged and
//! dropped.

use aquamon_core::event_names::EVENT_AUDIT_RECORDED;
use aquamon_db::models::audit::CreateAuditLog;
use aquamon_db::repositories::AuditLogRepo;
use aquamon_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::MonitoringEvent;

/// Wrap an audit entry in a bus event. The acting user also goes on the
/// envelope so other subscribers can see who did it.
pub fn audit_event(entry: &CreateAuditLog) -> MonitoringEvent {
    let payload = serde_json::to_value(entry).unwrap_or_default();
    let mut event = MonitoringEvent::new(EVENT_AUDIT_RECORDED).with_payload(payload);
    event.actor_user_id = entry.user_id;
    event
}

/// Turn an audit event back into an insert DTO. Returns `None` for any
/// other event type or a malformed payload.
pub fn audit_entry(event: &MonitoringEvent) -> Option<CreateAuditLog> {
    if event.event_type != EVENT_AUDIT_RECORDED {
        return None;
    }
    serde_json::from_value(event.payload.clone()).ok()
}

/// Background service that persists audit events.
pub struct AuditWriter;

impl AuditWriter {
    /// Run the persistence loop until the bus is dropped.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<MonitoringEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let Some(entry) = audit_entry(&event) else {
                        continue;
                    };
                    if let Err(e) = AuditLogRepo::create(&pool, &entry).await {
                        tracing::error!(
                            error = %e,
                            action = %entry.action,
                            "Failed to write audit log entry"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Audit writer lagged, some entries were lost");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, audit writer shutting down");
                    break;
                }
            }
        }
    }
}
