//! Fan-out of new readings to joined WebSocket connections.

use std::sync::Arc;

use aquamon_core::event_names::EVENT_READING_CREATED;
use aquamon_core::types::DbId;
use aquamon_events::MonitoringEvent;
use axum::extract::ws::Message;
use tokio::sync::broadcast;

use crate::ws::protocol::ServerFrame;
use crate::ws::WsManager;

/// Pushes every `reading.created` event to the connections joined to the
/// reading's project.
pub struct ReadingBroadcaster {
    ws_manager: Arc<WsManager>,
}

impl ReadingBroadcaster {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run until the event bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<MonitoringEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Some((project_id, text)) = reading_frame(&event) {
                        let sent = self
                            .ws_manager
                            .send_to_project(project_id, Message::Text(text.into()))
                            .await;
                        tracing::trace!(project_id, sent, "Pushed reading");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Reading broadcaster lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, reading broadcaster shutting down");
                    break;
                }
            }
        }
    }
}

/// The project channel and frame text for a reading event, or `None` for
/// any other event or one without a project.
pub fn reading_frame(event: &MonitoringEvent) -> Option<(DbId, String)> {
    if event.event_type != EVENT_READING_CREATED {
        return None;
    }
    let project_id = event.project_id?;
    Some((
        project_id,
        ServerFrame::new_sensor_data(&event.payload).to_text(),
    ))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reading_events_become_sensor_data_frames() {
        let event = MonitoringEvent::new(EVENT_READING_CREATED)
            .with_project(7)
            .with_payload(json!({"id": 1, "sensor_type": "pH"}));

        let (project_id, text) = reading_frame(&event).unwrap();
        assert_eq!(project_id, 7);
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["type"], "new-sensor-data");
        assert_eq!(v["data"]["sensor_type"], "pH");
    }

    #[test]
    fn other_events_and_unscoped_readings_are_ignored() {
        assert!(reading_frame(&MonitoringEvent::new("audit.recorded").with_project(1)).is_none());
        assert!(reading_frame(&MonitoringEvent::new(EVENT_READING_CREATED)).is_none());
    }
}
