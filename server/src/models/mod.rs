/// Data models for the LinkUp server
///
/// Rows are fetched with `query_as` into these records; enums that appear
/// as TEXT columns carry `as_str`/`parse` helpers so the string form stays
/// in one place.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::AppError;

/// A user synced from the external identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub external_id: String,
    pub email: Option<String>,
    pub full_name: String,
    pub username: Option<String>,
    pub bio: String,
    pub location: String,
    pub profile_picture: String,
    pub cover_photo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The public slice of a user embedded in posts, comments, and lists.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub full_name: String,
    pub username: Option<String>,
    pub profile_picture: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            id: user.id,
            full_name: user.full_name.clone(),
            username: user.username.clone(),
            profile_picture: user.profile_picture.clone(),
        }
    }
}

/// Descriptive tag derived from what a post carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    Text,
    Image,
    TextWithImage,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Text => "text",
            PostType::Image => "image",
            PostType::TextWithImage => "text_with_image",
        }
    }

    /// None when a post would be empty, which is not a valid post.
    pub fn from_parts(has_text: bool, has_media: bool) -> Option<PostType> {
        match (has_text, has_media) {
            (true, true) => Some(PostType::TextWithImage),
            (true, false) => Some(PostType::Text),
            (false, true) => Some(PostType::Image),
            (false, false) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub seq: i64,
    pub user_id: Uuid,
    pub content: Option<String>,
    pub media_urls: Json<Vec<String>>,
    pub post_type: String,
    pub created_at: DateTime<Utc>,
}

/// A post as it appears in a feed or profile: author resolved, counts
/// attached, viewer-specific flags filled in.
#[derive(Debug, Clone, Serialize)]
pub struct FeedPost {
    pub id: Uuid,
    pub author: Option<UserSummary>,
    pub content: Option<String>,
    pub media_urls: Vec<String>,
    pub post_type: String,
    pub like_count: i64,
    pub comment_count: i64,
    pub liked: bool,
    pub saved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A comment with its author resolved for display.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Story {
    pub id: Uuid,
    pub user_id: Uuid,
    pub media_url: Option<String>,
    pub text: Option<String>,
    pub background: Option<String>,
    pub media_type: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A story with author and viewers resolved.
#[derive(Debug, Clone, Serialize)]
pub struct StoryView {
    #[serde(flatten)]
    pub story: Story,
    pub author: Option<UserSummary>,
    pub viewers: Vec<UserSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    Image,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub text: Option<String>,
    pub media_url: Option<String>,
    pub message_type: String,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

/// An inbox entry: a message addressed to the caller with its sender.
#[derive(Debug, Clone, Serialize)]
pub struct InboxEntry {
    #[serde(flatten)]
    pub message: Message,
    pub sender: Option<UserSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Comment,
    Follow,
    Message,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Like => "like",
            NotificationKind::Comment => "comment",
            NotificationKind::Follow => "follow",
            NotificationKind::Message => "message",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub kind: String,
    pub body: String,
    pub post_id: Option<Uuid>,
    pub story_id: Option<Uuid>,
    pub message_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification with its sender resolved for display.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub sender: Option<UserSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
        }
    }
}

impl TryFrom<&str> for RequestStatus {
    type Error = AppError;

    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            other => Err(AppError::Internal(format!(
                "unknown request status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConnectionRequest {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl ConnectionRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending.as_str()
    }

    pub fn is_accepted(&self) -> bool {
        self.status == RequestStatus::Accepted.as_str()
    }
}

/// An incoming pending request resolved to the requester's profile.
#[derive(Debug, Clone, Serialize)]
pub struct PendingRequest {
    pub request_id: Uuid,
    pub requester: UserSummary,
    pub created_at: DateTime<Utc>,
}

/// Everything `GET /api/user/connections` returns in one shape.
#[derive(Debug, Clone, Serialize)]
pub struct Relationships {
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
    pub connections: Vec<UserSummary>,
    pub pending_requests: Vec<PendingRequest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_type_derivation() {
        assert_eq!(PostType::from_parts(true, true), Some(PostType::TextWithImage));
        assert_eq!(PostType::from_parts(true, false), Some(PostType::Text));
        assert_eq!(PostType::from_parts(false, true), Some(PostType::Image));
        assert_eq!(PostType::from_parts(false, false), None);
    }

    #[test]
    fn test_request_status_round_trip() {
        for status in [RequestStatus::Pending, RequestStatus::Accepted] {
            assert_eq!(RequestStatus::try_from(status.as_str()).unwrap(), status);
        }
        assert!(RequestStatus::try_from("rejected").is_err());
    }

    #[test]
    fn test_notification_kind_strings() {
        assert_eq!(NotificationKind::Like.as_str(), "like");
        assert_eq!(NotificationKind::Comment.as_str(), "comment");
        assert_eq!(NotificationKind::Follow.as_str(), "follow");
        assert_eq!(NotificationKind::Message.as_str(), "message");
    }
}
