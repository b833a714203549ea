use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::db::{message_repo, user_repo};
use crate::error::{AppError, Result};
use crate::models::{InboxEntry, Message, MessageType, NotificationKind};
use crate::realtime::{ConnectionManager, LiveEvent};
use crate::services::notifications::{NotificationRefs, NotificationService};

/// Newest message per distinct sender, in recency order. Expects the
/// entries newest-first, which is how the inbox query returns them.
pub fn reduce_recent(entries: Vec<InboxEntry>) -> Vec<InboxEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.message.from_user_id))
        .collect()
}

/// Direct messages between users, with best-effort live delivery.
#[derive(Clone)]
pub struct MessageService {
    pool: PgPool,
    notifications: NotificationService,
    live: ConnectionManager,
}

impl MessageService {
    pub fn new(pool: PgPool, notifications: NotificationService, live: ConnectionManager) -> Self {
        Self {
            pool,
            notifications,
            live,
        }
    }

    /// Persist the message, then try the receiver's live channel. A
    /// receiver who is offline just sees the message on their next fetch.
    pub async fn send_message(
        &self,
        sender: Uuid,
        receiver: Uuid,
        text: Option<String>,
        media_url: Option<String>,
    ) -> Result<Message> {
        let text = text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        if text.is_none() && media_url.is_none() {
            return Err(AppError::InvalidOperation(
                "a message needs text or an image".to_string(),
            ));
        }
        user_repo::find_by_id(&self.pool, receiver)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

        let message_type = if media_url.is_some() {
            MessageType::Image
        } else {
            MessageType::Text
        };

        let message = message_repo::insert_message(
            &self.pool,
            sender,
            receiver,
            text.as_deref(),
            media_url.as_deref(),
            message_type.as_str(),
        )
        .await?;

        self.live
            .push(
                receiver,
                LiveEvent::Message {
                    message: message.clone(),
                },
            )
            .await;

        self.notifications
            .notify(
                sender,
                receiver,
                NotificationKind::Message,
                NotificationRefs::message(message.id),
                "sent you a message",
            )
            .await?;

        Ok(message)
    }

    /// The whole thread with one peer, newest first. Fetching is how the
    /// reader acknowledges: everything the peer sent is flipped to seen.
    /// A repeat fetch finds nothing left to flip.
    pub async fn fetch_thread(&self, reader: Uuid, peer: Uuid) -> Result<Vec<Message>> {
        let messages = message_repo::thread_between(&self.pool, reader, peer).await?;
        message_repo::mark_thread_seen(&self.pool, reader, peer).await?;
        Ok(messages)
    }

    /// One entry per correspondent, newest first.
    pub async fn recent_threads(&self, user_id: Uuid) -> Result<Vec<InboxEntry>> {
        let inbox = message_repo::inbox_for(&self.pool, user_id).await?;
        Ok(reduce_recent(inbox))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn entry(from: Uuid, to: Uuid, minutes_ago: i64, text: &str) -> InboxEntry {
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
    fn test_reduce_recent_keeps_newest_per_sender() {
        let me = Uuid::new_v4();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        // Newest-first, as the inbox query returns them.
        let inbox = vec![
            entry(alice, me, 1, "alice latest"),
            entry(bob, me, 5, "bob latest"),
            entry(alice, me, 10, "alice older"),
            entry(bob, me, 20, "bob older"),
            entry(alice, me, 30, "alice oldest"),
        ];

        let recent = reduce_recent(inbox);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message.text.as_deref(), Some("alice latest"));
        assert_eq!(recent[1].message.text.as_deref(), Some("bob latest"));
    }

    #[test]
    fn test_reduce_recent_empty_inbox() {
        assert!(reduce_recent(Vec::new()).is_empty());
    }
}
