use std::collections::{HashMap, HashSet};

use aquamon_core::types::{DbId, Timestamp};
use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Authenticated user behind the connection.
    pub user_id: DbId,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// Projects this connection has joined.
    pub projects: HashSet<DbId>,
    pub connected_at: Timestamp,
}

/// Manages all active WebSocket connections and their project channels.
///
/// Thread-safe via interior `RwLock`; wrapped in `Arc` and shared across
/// the application.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection with no project subscriptions.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String, user_id: DbId) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id,
            sender: tx,
            projects: HashSet::new(),
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID, dropping its subscriptions.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Subscribe a connection to a project channel.
    ///
    /// Returns `false` if the connection is unknown.
    pub async fn join(&self, conn_id: &str, project_id: DbId) -> bool {
        match self.connections.write().await.get_mut(conn_id) {
            Some(conn) => {
                conn.projects.insert(project_id);
                true
            }
            None => false,
        }
    }

    /// Unsubscribe a connection from a project channel.
    ///
    /// Returns `true` if the connection had joined that project.
    pub async fn leave(&self, conn_id: &str, project_id: DbId) -> bool {
        self.connections
            .write()
            .await
            .get_mut(conn_id)
            .is_some_and(|conn| conn.projects.remove(&project_id))
    }

    /// Send a message to every connection joined to `project_id`.
    ///
    /// Closed channels are skipped; they are cleaned up when their receive
    /// loop ends. Returns the number of connections the message was sent to.
    pub async fn send_to_project(&self, project_id: DbId, message: Message) -> usize {
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values() {
            if conn.projects.contains(&project_id) {
                let _ = conn.sender.send(message.clone());
                count += 1;
            }
        }
        count
    }

    /// Send a message to one connection. Returns `false` if it is gone.
    pub async fn send_to(&self, conn_id: &str, message: Message) -> bool {
        self.connections
            .read()
            .await
            .get(conn_id)
            .is_some_and(|conn| conn.sender.send(message).is_ok())
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Number of connections joined to `project_id`.
    pub async fn subscriber_count(&self, project_id: DbId) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|conn| conn.projects.contains(&project_id))
            .count()
    }

    /// Send a Close frame to every connection, then clear the map.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
