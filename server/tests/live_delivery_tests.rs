/// Tests for the live-delivery registry and its wire format
use chrono::Utc;
use uuid::Uuid;

use linkup_server::models::{Comment, Message};
use linkup_server::realtime::{ConnectionManager, LiveEvent};

fn message_to(user_id: Uuid) -> Message {
    Message {
        id: Uuid::new_v4(),
        from_user_id: Uuid::new_v4(),
        to_user_id: user_id,
        text: Some("hello".to_string()),
        media_url: None,
        message_type: "text".to_string(),
        seen: false,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_register_sends_greeting() {
    let manager = ConnectionManager::new();
    let user = Uuid::new_v4();

    let (_, mut rx) = manager.register(user).await;

    let first = rx.recv().await.expect("greeting event");
    assert!(matches!(first, LiveEvent::Connected));
}

#[tokio::test]
async fn test_push_reaches_all_user_channels() {
    let manager = ConnectionManager::new();
    let user = Uuid::new_v4();

    let (_, mut rx1) = manager.register(user).await;
    let (_, mut rx2) = manager.register(user).await;
    // Skip greetings.
    rx1.recv().await.expect("greeting");
    rx2.recv().await.expect("greeting");

    let delivered = manager
        .push(
            user,
            LiveEvent::Message {
                message: message_to(user),
            },
        )
        .await;

    assert!(delivered);
    assert!(matches!(
        rx1.recv().await.expect("event"),
        LiveEvent::Message { .. }
    ));
    assert!(matches!(
        rx2.recv().await.expect("event"),
        LiveEvent::Message { .. }
    ));
}

#[tokio::test]
async fn test_push_to_offline_user() {
    let manager = ConnectionManager::new();
    let user = Uuid::new_v4();

    let delivered = manager
        .push(
            user,
            LiveEvent::Message {
                message: message_to(user),
            },
        )
        .await;

    assert!(!delivered);
}

#[tokio::test]
async fn test_unregister_drops_single_channel() {
    let manager = ConnectionManager::new();
    let user = Uuid::new_v4();

    let (id1, mut rx1) = manager.register(user).await;
    let (id2, mut rx2) = manager.register(user).await;
    rx1.recv().await.expect("greeting");
    rx2.recv().await.expect("greeting");

    manager.unregister(user, id1).await;
    assert!(manager.is_connected(user).await);
    assert_eq!(manager.connection_count().await, 1);

    let delivered = manager
        .push(
            user,
            LiveEvent::Message {
                message: message_to(user),
            },
        )
        .await;
    assert!(delivered);
    assert!(matches!(
        rx2.recv().await.expect("event"),
        LiveEvent::Message { .. }
    ));

    manager.unregister(user, id2).await;
    assert!(!manager.is_connected(user).await);
    assert_eq!(manager.connection_count().await, 0);
}

#[tokio::test]
async fn test_broadcast_reaches_all_users() {
    let manager = ConnectionManager::new();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    let (_, mut rx_alice) = manager.register(alice).await;
    let (_, mut rx_bob) = manager.register(bob).await;
    rx_alice.recv().await.expect("greeting");
    rx_bob.recv().await.expect("greeting");

    let comment = Comment {
        id: Uuid::new_v4(),
        post_id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        content: "nice one".to_string(),
        created_at: Utc::now(),
    };
    manager
        .broadcast(LiveEvent::PostCommented {
            post_id: comment.post_id,
            comment,
        })
        .await;

    assert!(matches!(
        rx_alice.recv().await.expect("event"),
        LiveEvent::PostCommented { .. }
    ));
    assert!(matches!(
        rx_bob.recv().await.expect("event"),
        LiveEvent::PostCommented { .. }
    ));
}

#[test]
fn test_sse_frame_format() {
    let user = Uuid::new_v4();
    let event = LiveEvent::Message {
        message: message_to(user),
    };

    let frame = event.to_sse_frame();
    assert!(frame.starts_with("event: message\ndata: "));
    assert!(frame.ends_with("\n\n"));

    let data = frame
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .expect("data line");
    let json: serde_json::Value = serde_json::from_str(data).expect("valid json");
    assert_eq!(json["type"], "message");
    assert_eq!(json["message"]["to_user_id"], user.to_string());
}

#[test]
fn test_connected_frame() {
    let frame = LiveEvent::Connected.to_sse_frame();
    assert_eq!(frame, "event: connected\ndata: {\"type\":\"connected\"}\n\n");
}
