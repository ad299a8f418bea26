//! Unit tests for `WsManager`.
//!
//! These exercise the connection manager directly, without HTTP upgrades:
//! add/remove, project subscriptions, fan-out and shutdown.

use aquamon_api::ws::WsManager;
use axum::extract::ws::Message;

// ---------------------------------------------------------------------------
// Test: connection bookkeeping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::new();

    assert_eq!(manager.connection_count().await, 0);
}

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string(), 1).await;
    let _rx2 = manager.add("conn-2".to_string(), 2).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 1);

    // Unknown ids are ignored.
    manager.remove("nonexistent").await;
    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: project subscriptions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn join_and_leave_update_subscriber_count() {
    let manager = WsManager::new();
    let _rx = manager.add("conn-1".to_string(), 1).await;

    assert!(manager.join("conn-1", 10).await);
    assert!(manager.join("conn-1", 11).await);
    assert_eq!(manager.subscriber_count(10).await, 1);

    assert!(manager.leave("conn-1", 10).await);
    assert_eq!(manager.subscriber_count(10).await, 0);
    assert_eq!(manager.subscriber_count(11).await, 1);

    // Leaving twice reports that nothing was joined.
    assert!(!manager.leave("conn-1", 10).await);
}

#[tokio::test]
async fn join_unknown_connection_returns_false() {
    let manager = WsManager::new();

    assert!(!manager.join("ghost", 10).await);
    assert!(!manager.leave("ghost", 10).await);
}

#[tokio::test]
async fn remove_drops_subscriptions() {
    let manager = WsManager::new();
    let _rx = manager.add("conn-1".to_string(), 1).await;
    manager.join("conn-1", 10).await;

    manager.remove("conn-1").await;

    assert_eq!(manager.subscriber_count(10).await, 0);
}

// ---------------------------------------------------------------------------
// Test: fan-out
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_project_reaches_only_joined_connections() {
    let manager = WsManager::new();
    let mut joined = manager.add("conn-1".to_string(), 1).await;
    let mut other = manager.add("conn-2".to_string(), 2).await;
    manager.join("conn-1", 10).await;
    manager.join("conn-2", 20).await;

    let sent = manager
        .send_to_project(10, Message::Text("reading".into()))
        .await;

    assert_eq!(sent, 1);
    match joined.try_recv() {
        Ok(Message::Text(text)) => assert_eq!(text.as_str(), "reading"),
        unexpected => panic!("Expected a text frame, got {unexpected:?}"),
    }
    assert!(other.try_recv().is_err());
}

#[tokio::test]
async fn send_to_project_with_no_subscribers_sends_nothing() {
    let manager = WsManager::new();
    let _rx = manager.add("conn-1".to_string(), 1).await;

    let sent = manager.send_to_project(99, Message::Text("x".into())).await;

    assert_eq!(sent, 0);
}

#[tokio::test]
async fn send_to_targets_one_connection() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string(), 1).await;

    assert!(manager.send_to("conn-1", Message::Text("hello".into())).await);
    assert!(!manager.send_to("conn-2", Message::Text("hello".into())).await);
    assert!(matches!(rx.try_recv(), Ok(Message::Text(_))));
}

// ---------------------------------------------------------------------------
// Test: shutdown and heartbeat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string(), 1).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);
    assert!(matches!(rx.try_recv(), Ok(Message::Close(None))));
}

#[tokio::test]
async fn shutdown_all_ends_each_outbound_channel() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string(), 1).await;
    manager.join("conn-1", 10).await;

    manager.shutdown_all().await;

    // The socket's sender task sees the close frame and then the end of the
    // channel, which is what lets the connection task finish.
    assert!(matches!(rx.recv().await, Some(Message::Close(None))));
    assert!(rx.recv().await.is_none());
    assert_eq!(manager.subscriber_count(10).await, 0);
}

#[tokio::test]
async fn ping_all_sends_ping_frames() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string(), 1).await;
    let mut rx2 = manager.add("conn-2".to_string(), 2).await;

    manager.ping_all().await;

    assert!(matches!(rx1.try_recv(), Ok(Message::Ping(_))));
    assert!(matches!(rx2.try_recv(), Ok(Message::Ping(_))));
}
