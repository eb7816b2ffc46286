//! Unit tests for `SessionRegistry`: add/remove semantics, targeted
//! delivery, and shutdown behaviour. No HTTP upgrades involved.

use assert_matches::assert_matches;
use axum::extract::ws::Message;
use curio_api::ws::SessionRegistry;
use serde_json::json;

fn frame_json(msg: Message) -> serde_json::Value {
    let Message::Text(text) = msg else {
        panic!("expected a text frame");
    };
    serde_json::from_str(&text).expect("frame json")
}

// ---------------------------------------------------------------------------
// Test: add/remove bookkeeping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_track_the_connection_count() {
    let registry = SessionRegistry::new();
    assert_eq!(registry.connection_count().await, 0);

    let _rx = registry.add("conn-1".to_string()).await;
    assert_eq!(registry.connection_count().await, 1);

    registry.remove("conn-1").await;
    assert_eq!(registry.connection_count().await, 0);

    // Removing an unknown handle is a no-op.
    registry.remove("nonexistent").await;
    assert_eq!(registry.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: targeted delivery by session and by visitor
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_session_delivers_an_event_frame() {
    let registry = SessionRegistry::new();
    let mut rx = registry.add("conn-1".to_string()).await;

    let sent = registry
        .send_to_session("conn-1", "getCoaPartsResult", &json!({"parts": []}))
        .await;
    assert!(sent);

    let value = frame_json(rx.try_recv().expect("frame"));
    assert_eq!(value["event"], "getCoaPartsResult");
    assert_eq!(value["data"]["parts"], json!([]));
}

#[tokio::test]
async fn send_to_missing_session_is_best_effort() {
    let registry = SessionRegistry::new();
    let sent = registry
        .send_to_session("nobody", "loginResult", &json!({}))
        .await;
    assert!(!sent);
}

#[tokio::test]
async fn send_to_visitor_reaches_every_bound_session() {
    let registry = SessionRegistry::new();
    let mut rx_a = registry.add("conn-a".to_string()).await;
    let mut rx_b = registry.add("conn-b".to_string()).await;
    let _rx_c = registry.add("conn-c".to_string()).await;

    registry.bind_visitor("conn-a", 7).await;
    registry.bind_visitor("conn-b", 7).await;
    registry.bind_visitor("conn-c", 8).await;

    let count = registry
        .send_to_visitor(7, "kickedFromExhibit", &json!({"parent": 601}))
        .await;
    assert_eq!(count, 2);

    assert_eq!(frame_json(rx_a.try_recv().unwrap())["event"], "kickedFromExhibit");
    assert_eq!(frame_json(rx_b.try_recv().unwrap())["event"], "kickedFromExhibit");
}

// ---------------------------------------------------------------------------
// Test: token binding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn token_binding_round_trips() {
    let registry = SessionRegistry::new();
    let _rx = registry.add("conn-1".to_string()).await;

    assert_eq!(registry.token_of("conn-1").await, None);
    registry.set_token("conn-1", "jwt-goes-here".into()).await;
    assert_eq!(
        registry.token_of("conn-1").await,
        Some("jwt-goes-here".into())
    );

    // Unknown sessions never hold tokens.
    assert_eq!(registry.token_of("ghost").await, None);
}

// ---------------------------------------------------------------------------
// Test: shutdown closes every session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears_the_map() {
    let registry = SessionRegistry::new();
    let mut rx_a = registry.add("conn-a".to_string()).await;
    let mut rx_b = registry.add("conn-b".to_string()).await;

    registry.shutdown_all().await;

    assert_matches!(rx_a.try_recv(), Ok(Message::Close(_)));
    assert_matches!(rx_b.try_recv(), Ok(Message::Close(_)));
    assert_eq!(registry.connection_count().await, 0);
}

#[tokio::test]
async fn ping_all_reaches_every_connection() {
    let registry = SessionRegistry::new();
    let mut rx = registry.add("conn-1".to_string()).await;

    assert_eq!(registry.ping_all().await, 1);
    assert_matches!(rx.try_recv(), Ok(Message::Ping(_)));
}
