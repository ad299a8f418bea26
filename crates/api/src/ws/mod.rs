//! WebSocket push channel for dashboard clients.
//!
//! Provides connection management with per-project subscriptions,
//! heartbeat monitoring, and the HTTP upgrade handler.

mod handler;
mod heartbeat;
pub mod manager;
pub mod protocol;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
