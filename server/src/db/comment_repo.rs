use crate::models::{Comment, CommentView, UserSummary};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub async fn insert_comment(
    pool: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (id, post_id, user_id, content)
        VALUES ($1, $2, $3, $4)
        RETURNING id, post_id, user_id, content, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(post_id)
    .bind(user_id)
    .bind(content)
    .fetch_one(pool)
    .await
}

/// The ordered comment list for a post, oldest first, authors resolved.
pub async fn list_for_post(
    pool: &PgPool,
    post_id: Uuid,
) -> Result<Vec<CommentView>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.post_id, c.user_id, c.content, c.created_at,
               u.id AS author_id, u.full_name AS author_name,
               u.username AS author_username, u.profile_picture AS author_picture
        FROM comments c
        LEFT JOIN users u ON u.id = c.user_id
        WHERE c.post_id = $1
        ORDER BY c.created_at ASC, c.id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| CommentView {
            comment: Comment {
                id: row.get("id"),
                post_id: row.get("post_id"),
                user_id: row.get("user_id"),
                content: row.get("content"),
                created_at: row.get("created_at"),
            },
            author: row.get::<Option<Uuid>, _>("author_id").map(|id| UserSummary {
                id,
                full_name: row
                    .get::<Option<String>, _>("author_name")
                    .unwrap_or_default(),
                username: row.get("author_username"),
                profile_picture: row
                    .get::<Option<String>, _>("author_picture")
                    .unwrap_or_default(),
            }),
        })
        .collect())
}
