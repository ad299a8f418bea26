//! AquaMon event bus.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`MonitoringEvent`] -- the event envelope, optionally keyed by project.
//! - [`AuditWriter`] -- background service that writes audit events to the
//!   `audit_logs` table.

pub mod audit_writer;
pub mod bus;

pub use audit_writer::AuditWriter;
pub use bus::{EventBus, MonitoringEvent};
