//! Integration tests for [`RoomWatch`]: one live connection per context,
//! rebuilt when the room or user changes and torn down when the identity
//! goes away.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{accepted, context, settle, MockConnector};
use roomwire_protocol::{ChatMessage, RoomId};
use roomwire_room::{ConnectionConfig, RoomEvent, RoomWatch};

fn watch(connector: &MockConnector) -> RoomWatch<MockConnector> {
    RoomWatch::new(
        Arc::new(connector.clone()),
        ConnectionConfig::default(),
        None,
    )
}

async fn opened(watch: &mut RoomWatch<MockConnector>) {
    let event = tokio::time::timeout(Duration::from_secs(30), watch.next_event())
        .await
        .expect("timed out waiting for open");
    assert_eq!(event, Some(RoomEvent::Opened));
}

#[tokio::test(start_paused = true)]
async fn test_no_identity_means_no_connection() {
    let (connector, _servers) = MockConnector::new();
    let mut watch = watch(&connector);

    assert!(!watch.update(None));
    assert!(watch.is_idle());
    assert_eq!(watch.next_event().await, None);

    watch.send("ignored");
    assert!(watch.messages().is_empty());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(connector.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_room_change_replaces_connection() {
    let (connector, mut servers) = MockConnector::new();
    let mut watch = watch(&connector);

    assert!(watch.update(Some(context("r1", "u1", "alice"))));
    opened(&mut watch).await;
    let first = accepted(&mut servers).await;
    first.say("old", "r1", "alice");
    assert!(matches!(
        watch.next_event().await,
        Some(RoomEvent::Message(_))
    ));

    assert!(watch.update(Some(context("r2", "u1", "alice"))));
    opened(&mut watch).await;
    let second = accepted(&mut servers).await;
    settle().await;

    assert!(first.is_closed(), "old connection must be closed");
    assert!(second.target.contains("/ws/joinRoom/r2?"));
    assert!(watch.messages().is_empty(), "log starts fresh");
    assert_eq!(connector.attempts(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_user_change_reconnects_with_new_identity() {
    let (connector, mut servers) = MockConnector::new();
    let mut watch = watch(&connector);

    watch.update(Some(context("r1", "u1", "alice")));
    opened(&mut watch).await;
    let first = accepted(&mut servers).await;

    assert!(watch.update(Some(context("r1", "u2", "bob"))));
    opened(&mut watch).await;
    let second = accepted(&mut servers).await;
    settle().await;

    assert!(first.is_closed());
    assert_eq!(
        second.target,
        "ws://localhost:8080/ws/joinRoom/r1?userId=u2&username=bob"
    );
}

#[tokio::test(start_paused = true)]
async fn test_username_only_change_keeps_connection() {
    let (connector, mut servers) = MockConnector::new();
    let mut watch = watch(&connector);

    watch.update(Some(context("r1", "u1", "alice")));
    opened(&mut watch).await;
    let server = accepted(&mut servers).await;

    assert!(!watch.update(Some(context("r1", "u1", "Alice Liddell"))));
    assert!(!watch.update(Some(context("r1", "u1", "alice"))));
    settle().await;

    assert!(!server.is_closed());
    assert_eq!(connector.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_same_context_rejoins_after_terminal_close() {
    let (connector, mut servers) = MockConnector::new();
    let mut watch = watch(&connector);

    watch.update(Some(context("r1", "u1", "alice")));
    opened(&mut watch).await;
    accepted(&mut servers).await.close(Some(1008));
    assert_eq!(
        watch.next_event().await,
        Some(RoomEvent::Unavailable { code: Some(1008) })
    );

    // The old connection gave up, so the same context starts a new one.
    assert!(watch.update(Some(context("r1", "u1", "alice"))));
    opened(&mut watch).await;
    let server = accepted(&mut servers).await;
    assert_eq!(
        server.target,
        "ws://localhost:8080/ws/joinRoom/r1?userId=u1&username=alice"
    );

    // While the new one is live, repeating the context is a no-op.
    assert!(!watch.update(Some(context("r1", "u1", "alice"))));
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(connector.attempts(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_identity_loss_disposes_and_goes_idle() {
    let (connector, mut servers) = MockConnector::new();
    let mut watch = watch(&connector);

    watch.update(Some(context("r1", "u1", "alice")));
    opened(&mut watch).await;
    let server = accepted(&mut servers).await;
    server.close(None);
    settle().await;

    // Now backing off; losing the identity must cancel the reconnect.
    watch.update(None);
    assert!(watch.is_idle());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(connector.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_send_routes_to_live_connection() {
    let (connector, mut servers) = MockConnector::new();
    let mut watch = watch(&connector);

    watch.update(Some(context("r1", "u1", "alice")));
    opened(&mut watch).await;
    let mut server = accepted(&mut servers).await;

    watch.send("hello");
    assert_eq!(server.received().await.as_deref(), Some("hello"));

    server.say("hello", "r1", "alice");
    watch.next_event().await;
    assert_eq!(
        watch.messages(),
        vec![ChatMessage::new("hello", RoomId::new("r1"), "alice")]
    );
}

#[tokio::test(start_paused = true)]
async fn test_dispose_closes_and_idles() {
    let (connector, mut servers) = MockConnector::new();
    let mut watch = watch(&connector);

    watch.update(Some(context("r1", "u1", "alice")));
    opened(&mut watch).await;
    let server = accepted(&mut servers).await;

    watch.dispose();
    settle().await;
    assert!(watch.is_idle());
    assert!(server.is_closed());
}
