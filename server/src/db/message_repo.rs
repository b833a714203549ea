use crate::models::{InboxEntry, Message, UserSummary};
use sqlx::{PgPool, Row};
use uuid::Uuid;

const MESSAGE_COLUMNS: &str =
    "id, from_user_id, to_user_id, text, media_url, message_type, seen, created_at";

pub async fn insert_message(
    pool: &PgPool,
    from_user_id: Uuid,
    to_user_id: Uuid,
    text: Option<&str>,
    media_url: Option<&str>,
    message_type: &str,
) -> Result<Message, sqlx::Error> {
    sqlx::query_as::<_, Message>(&format!(
        r#"
        INSERT INTO messages (id, from_user_id, to_user_id, text, media_url, message_type)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {MESSAGE_COLUMNS}
        "#,
    ))
    .bind(Uuid::new_v4())
    .bind(from_user_id)
    .bind(to_user_id)
    .bind(text)
    .bind(media_url)
    .bind(message_type)
    .fetch_one(pool)
    .await
}

/// Every message between the unordered pair, newest first.
pub async fn thread_between(
    pool: &PgPool,
    a: Uuid,
    b: Uuid,
) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(&format!(
        r#"
        SELECT {MESSAGE_COLUMNS}
        FROM messages
        WHERE (from_user_id = $1 AND to_user_id = $2)
           OR (from_user_id = $2 AND to_user_id = $1)
        ORDER BY created_at DESC
        "#,
    ))
    .bind(a)
    .bind(b)
    .fetch_all(pool)
    .await
}

/// Mark everything the peer sent to the reader as seen. Idempotent.
pub async fn mark_thread_seen(
    pool: &PgPool,
    reader_id: Uuid,
    peer_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let affected = sqlx::query(
        r#"
        UPDATE messages
        SET seen = TRUE
        WHERE from_user_id = $2 AND to_user_id = $1 AND NOT seen
        "#,
    )
    .bind(reader_id)
    .bind(peer_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(affected)
}

/// All messages addressed to a user, newest first, senders resolved.
pub async fn inbox_for(pool: &PgPool, user_id: Uuid) -> Result<Vec<InboxEntry>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT m.id, m.from_user_id, m.to_user_id, m.text, m.media_url,
               m.message_type, m.seen, m.created_at,
               u.id AS sender_id, u.full_name AS sender_name,
               u.username AS sender_username, u.profile_picture AS sender_picture
        FROM messages m
        LEFT JOIN users u ON u.id = m.from_user_id
        WHERE m.to_user_id = $1
        ORDER BY m.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| InboxEntry {
            message: Message {
                id: row.get("id"),
                from_user_id: row.get("from_user_id"),
                to_user_id: row.get("to_user_id"),
                text: row.get("text"),
                media_url: row.get("media_url"),
                message_type: row.get("message_type"),
                seen: row.get("seen"),
                created_at: row.get("created_at"),
            },
            sender: row.get::<Option<Uuid>, _>("sender_id").map(|id| UserSummary {
                id,
                full_name: row
                    .get::<Option<String>, _>("sender_name")
                    .unwrap_or_default(),
                username: row.get("sender_username"),
                profile_picture: row
                    .get::<Option<String>, _>("sender_picture")
                    .unwrap_or_default(),
            }),
        })
        .collect())
}

/// Per-recipient unseen totals for the daily digest. Recipients without an
/// email address are skipped at the call site, not here.
pub async fn unseen_counts(pool: &PgPool) -> Result<Vec<(Uuid, Option<String>, i64)>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT m.to_user_id, u.email, COUNT(*) AS unseen
        FROM messages m
        JOIN users u ON u.id = m.to_user_id
        WHERE NOT m.seen
        GROUP BY m.to_user_id, u.email
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| {
            (
                row.get::<Uuid, _>("to_user_id"),
                row.get::<Option<String>, _>("email"),
                row.get::<i64, _>("unseen"),
            )
        })
        .collect())
}
