use sqlx::PgPool;
use uuid::Uuid;

use crate::db::notification_repo;
use crate::error::Result;
use crate::models::{Notification, NotificationKind, NotificationView};

/// References a notification may carry back to its originating entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationRefs {
    pub post_id: Option<Uuid>,
    pub story_id: Option<Uuid>,
    pub message_id: Option<Uuid>,
}

impl NotificationRefs {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn post(post_id: Uuid) -> Self {
        Self {
            post_id: Some(post_id),
            ..Self::default()
        }
    }

    pub fn message(message_id: Uuid) -> Self {
        Self {
            message_id: Some(message_id),
            ..Self::default()
        }
    }
}

/// A mutation acting on the actor's own things never notifies.
pub fn suppressed(sender: Uuid, receiver: Uuid) -> bool {
    sender == receiver
}

/// Derives notification records from graph/content mutations.
#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fan out one derived record. Returns None when suppressed.
    pub async fn notify(
        &self,
        sender: Uuid,
        receiver: Uuid,
        kind: NotificationKind,
        refs: NotificationRefs,
        body: &str,
    ) -> Result<Option<Notification>> {
        if suppressed(sender, receiver) {
            return Ok(None);
        }

        let notification = notification_repo::insert(
            &self.pool,
            sender,
            receiver,
            kind.as_str(),
            body,
            refs.post_id,
            refs.story_id,
            refs.message_id,
        )
        .await?;

        Ok(Some(notification))
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<NotificationView>> {
        Ok(notification_repo::list_for(&self.pool, user_id).await?)
    }

    /// Flip records to read; only rows addressed to the caller are touched.
    pub async fn mark_read(&self, user_id: Uuid, notification_ids: &[Uuid]) -> Result<u64> {
        Ok(notification_repo::mark_read(&self.pool, user_id, notification_ids).await?)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        Ok(notification_repo::unread_count(&self.pool, user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_notifications_suppressed() {
        let user = Uuid::new_v4();
        assert!(suppressed(user, user));
        assert!(!suppressed(user, Uuid::new_v4()));
    }
}
