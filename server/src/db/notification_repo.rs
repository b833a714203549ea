use crate::models::{Notification, NotificationView, UserSummary};
use sqlx::{PgPool, Row};
use uuid::Uuid;

const NOTIFICATION_COLUMNS: &str =
    "id, sender_id, recipient_id, kind, body, post_id, story_id, message_id, is_read, created_at";

#[allow(clippy::too_many_arguments)]
pub async fn insert(
    pool: &PgPool,
    sender_id: Uuid,
    recipient_id: Uuid,
    kind: &str,
    body: &str,
    post_id: Option<Uuid>,
    story_id: Option<Uuid>,
    message_id: Option<Uuid>,
) -> Result<Notification, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        r#"
        INSERT INTO notifications (id, sender_id, recipient_id, kind, body, post_id, story_id, message_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {NOTIFICATION_COLUMNS}
        "#,
    ))
    .bind(Uuid::new_v4())
    .bind(sender_id)
    .bind(recipient_id)
    .bind(kind)
    .bind(body)
    .bind(post_id)
    .bind(story_id)
    .bind(message_id)
    .fetch_one(pool)
    .await
}

/// A user's notifications, newest first, senders resolved.
pub async fn list_for(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<NotificationView>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT n.id, n.sender_id, n.recipient_id, n.kind, n.body,
               n.post_id, n.story_id, n.message_id, n.is_read, n.created_at,
               u.id AS from_id, u.full_name AS from_name,
               u.username AS from_username, u.profile_picture AS from_picture
        FROM notifications n
        LEFT JOIN users u ON u.id = n.sender_id
        WHERE n.recipient_id = $1
        ORDER BY n.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| NotificationView {
            notification: Notification {
                id: row.get("id"),
                sender_id: row.get("sender_id"),
                recipient_id: row.get("recipient_id"),
                kind: row.get("kind"),
                body: row.get("body"),
                post_id: row.get("post_id"),
                story_id: row.get("story_id"),
                message_id: row.get("message_id"),
                is_read: row.get("is_read"),
                created_at: row.get("created_at"),
            },
            sender: row.get::<Option<Uuid>, _>("from_id").map(|id| UserSummary {
                id,
                full_name: row.get::<Option<String>, _>("from_name").unwrap_or_default(),
                username: row.get("from_username"),
                profile_picture: row
                    .get::<Option<String>, _>("from_picture")
                    .unwrap_or_default(),
            }),
        })
        .collect())
}

/// Mark notifications read. The recipient filter lives inside the UPDATE,
/// so a caller can never flip someone else's records.
pub async fn mark_read(
    pool: &PgPool,
    recipient_id: Uuid,
    notification_ids: &[Uuid],
) -> Result<u64, sqlx::Error> {
    let affected = sqlx::query(
        r#"
        UPDATE notifications
        SET is_read = TRUE
        WHERE recipient_id = $1 AND id = ANY($2)
        "#,
    )
    .bind(recipient_id)
    .bind(notification_ids)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(affected)
}

pub async fn unread_count(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        "SELECT COUNT(*) AS count FROM notifications WHERE recipient_id = $1 AND NOT is_read",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(row.get::<i64, _>("count"))
}
