//! Well-known platform event names and push-channel message types.
//!
//! Event names are published on the in-process event bus; message types are
//! the `type` discriminator of JSON frames exchanged with dashboard clients
//! over the WebSocket.

/// A reading was classified and persisted.
pub const EVENT_READING_CREATED: &str = "reading.created";

/// Server -> client: a new classified reading for a joined project.
pub const MSG_TYPE_NEW_SENSOR_DATA: &str = "new-sensor-data";

/// Client -> server: subscribe this connection to a project channel.
pub const MSG_TYPE_JOIN_PROJECT: &str = "join-project";

/// Client -> server: unsubscribe this connection from a project channel.
pub const MSG_TYPE_LEAVE_PROJECT: &str = "leave-project";

/// An auditable user action happened; persisted to `audit_logs` off the
/// request path.
pub const EVENT_AUDIT_RECORDED: &str = "audit.recorded";
