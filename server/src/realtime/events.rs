use crate::models::{Comment, Message, Notification};
use serde::Serialize;
use uuid::Uuid;

/// Server-originated events pushed over a live channel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// Greeting written when a stream opens
    Connected,
    /// A direct message addressed to the connected user
    Message { message: Message },
    /// A notification addressed to the connected user
    Notification { notification: Notification },
    /// A comment landed on a post anyone may be looking at
    PostCommented { post_id: Uuid, comment: Comment },
}

impl LiveEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LiveEvent::Connected => "connected",
            LiveEvent::Message { .. } => "message",
            LiveEvent::Notification { .. } => "notification",
            LiveEvent::PostCommented { .. } => "post_commented",
        }
    }

    /// Render as one server-sent-event frame.
    pub fn to_sse_frame(&self) -> String {
        let data = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("event: {}\ndata: {}\n\n", self.name(), data)
    }
}
