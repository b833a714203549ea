/// Unit tests for the core relationship/content rules
///
/// Covers the pure rule layer: toggle-type derivation, rate-limit window
/// arithmetic, notification suppression, handle generation, upload limits,
/// and the recent-thread reduction.
use chrono::{Duration, Utc};
use uuid::Uuid;

use linkup_server::clients::media::{validate_upload, MediaKind, UploadFile};
use linkup_server::clients::ExternalIdentity;
use linkup_server::config::MediaConfig;
use linkup_server::models::{InboxEntry, Message, PostType};
use linkup_server::services::graph::{
    over_request_limit, window_start, CONNECTION_REQUEST_LIMIT,
};
use linkup_server::services::identity::{handle_base, handle_with_suffix};
use linkup_server::services::messaging::reduce_recent;
use linkup_server::services::notifications::suppressed;

#[test]
fn test_post_type_derivation() {
    assert_eq!(PostType::from_parts(true, false), Some(PostType::Text));
    assert_eq!(PostType::from_parts(false, true), Some(PostType::Image));
    assert_eq!(
        PostType::from_parts(true, true),
        Some(PostType::TextWithImage)
    );
    // Empty posts are rejected before they reach the store.
    assert_eq!(PostType::from_parts(false, false), None);
}

#[test]
fn test_rate_limit_window_and_budget() {
    // The Nth request sees N-1 prior rows in the window: the 20th call is
    // allowed, the 21st is not.
    assert!(!over_request_limit(CONNECTION_REQUEST_LIMIT - 1));
    assert!(over_request_limit(CONNECTION_REQUEST_LIMIT));
    assert!(over_request_limit(CONNECTION_REQUEST_LIMIT + 5));

    let now = Utc::now();
    assert_eq!(now - window_start(now), Duration::hours(24));
}

#[test]
fn test_notification_suppression() {
    let actor = Uuid::new_v4();
    assert!(suppressed(actor, actor));
    assert!(!suppressed(actor, Uuid::new_v4()));
}

#[test]
fn test_handle_base_fallback_chain() {
    let identity = ExternalIdentity {
        id: "ext_9f27ab31".to_string(),
        email: Some("mara.lindt@example.org".to_string()),
        full_name: Some("Mara Lindt".to_string()),
        username: None,
        picture: None,
    };
    assert_eq!(handle_base(&identity), "mara_lindt");

    let no_email = ExternalIdentity {
        email: None,
        ..identity.clone()
    };
    assert_eq!(handle_base(&no_email), "user_ext_9f27");
}

#[test]
fn test_handle_suffix_range() {
    for _ in 0..32 {
        let handle = handle_with_suffix("mara_lindt");
        let suffix: u32 = handle
            .rsplit('_')
            .next()
            .and_then(|s| s.parse().ok())
            .expect("numeric suffix");
        assert!((1000..10000).contains(&suffix), "got {handle}");
    }
}

fn media_config() -> MediaConfig {
    MediaConfig {
        upload_url: String::new(),
        max_image_bytes: 5 * 1024 * 1024,
        max_video_bytes: 50 * 1024 * 1024,
    }
}

fn upload(content_type: &str, len: usize) -> UploadFile {
    UploadFile {
        filename: "upload.bin".to_string(),
        content_type: content_type.to_string(),
        bytes: vec![0u8; len],
    }
}

#[test]
fn test_upload_limit_boundaries() {
    assert_eq!(
        validate_upload(&upload("image/jpeg", 5 * 1024 * 1024), &media_config()).unwrap(),
        MediaKind::Image
    );
    assert!(validate_upload(&upload("image/jpeg", 5 * 1024 * 1024 + 1), &media_config()).is_err());

    assert_eq!(
        validate_upload(&upload("video/mp4", 50 * 1024 * 1024), &media_config()).unwrap(),
        MediaKind::Video
    );
    assert!(validate_upload(&upload("video/mp4", 50 * 1024 * 1024 + 1), &media_config()).is_err());
}

fn inbox_entry(from: Uuid, to: Uuid, minutes_ago: i64, text: &str) -> InboxEntry {
    InboxEntry {
        message: Message {
            id: Uuid::new_v4(),
            from_user_id: from,
            to_user_id: to,
            text: Some(text.to_string()),
            media_url: None,
            message_type: "text".to_string(),
            seen: false,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        },
        sender: None,
    }
}

#[test]
fn test_recent_thread_reduction() {
    let me = Uuid::new_v4();
    let (alice, bob, cara) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    let inbox = vec![
        inbox_entry(bob, me, 2, "bob newest"),
        inbox_entry(alice, me, 3, "alice newest"),
        inbox_entry(bob, me, 8, "bob older"),
        inbox_entry(cara, me, 13, "cara only"),
        inbox_entry(alice, me, 21, "alice older"),
    ];

    let recent = reduce_recent(inbox);
    let texts: Vec<_> = recent
        .iter()
        .map(|e| e.message.text.as_deref().unwrap_or_default())
        .collect();

    assert_eq!(texts, vec!["bob newest", "alice newest", "cara only"]);
}
