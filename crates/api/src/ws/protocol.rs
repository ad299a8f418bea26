//! JSON frames exchanged over the push channel.

use aquamon_core::event_names::{
    MSG_TYPE_JOIN_PROJECT, MSG_TYPE_LEAVE_PROJECT, MSG_TYPE_NEW_SENSOR_DATA,
};
use aquamon_core::types::DbId;
use serde::{Deserialize, Serialize};

/// Server -> client: a subscription request was accepted.
pub const MSG_TYPE_JOINED_PROJECT: &str = "joined-project";
/// Server -> client: a subscription was dropped.
pub const MSG_TYPE_LEFT_PROJECT: &str = "left-project";
/// Server -> client: a client frame was rejected.
pub const MSG_TYPE_ERROR: &str = "error";

/// A parsed client frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    JoinProject(DbId),
    LeaveProject(DbId),
}

#[derive(Deserialize)]
struct RawClientFrame {
    #[serde(rename = "type")]
    kind: String,
    project_id: Option<DbId>,
}

/// Parse `{"type": "join-project" | "leave-project", "project_id": N}`.
pub fn parse_client_frame(text: &str) -> Result<ClientCommand, String> {
    let frame: RawClientFrame =
        serde_json::from_str(text).map_err(|e| format!("Malformed message: {e}"))?;

    let project_id = |kind: &str| {
        frame
            .project_id
            .ok_or_else(|| format!("{kind} requires project_id"))
    };

    match frame.kind.as_str() {
        MSG_TYPE_JOIN_PROJECT => Ok(ClientCommand::JoinProject(project_id(MSG_TYPE_JOIN_PROJECT)?)),
        MSG_TYPE_LEAVE_PROJECT => Ok(ClientCommand::LeaveProject(project_id(
            MSG_TYPE_LEAVE_PROJECT,
        )?)),
        other => Err(format!("Unknown message type: {other}")),
    }
}

/// Server frame: `{"type": ..., "project_id"?: N, "message"?: "...", "data"?: ...}`.
#[derive(Debug, Serialize)]
pub struct ServerFrame<'a, T: Serialize> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<'a> ServerFrame<'a, ()> {
    pub fn joined(project_id: DbId) -> Self {
        Self::ack(MSG_TYPE_JOINED_PROJECT, project_id)
    }

    pub fn left(project_id: DbId) -> Self {
        Self::ack(MSG_TYPE_LEFT_PROJECT, project_id)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: MSG_TYPE_ERROR,
            project_id: None,
            message: Some(message.into()),
            data: None,
        }
    }

    fn ack(kind: &'a str, project_id: DbId) -> Self {
        Self {
            kind,
            project_id: Some(project_id),
            message: None,
            data: None,
        }
    }
}

impl<T: Serialize> ServerFrame<'static, T> {
    /// `{"type": "new-sensor-data", "data": reading}`.
    pub fn new_sensor_data(data: T) -> Self {
        Self {
            kind: MSG_TYPE_NEW_SENSOR_DATA,
            project_id: None,
            message: None,
            data: Some(data),
        }
    }
}

impl<T: Serialize> ServerFrame<'_, T> {
    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
