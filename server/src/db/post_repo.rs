use crate::models::{FeedPost, Post, UserSummary};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

const POST_COLUMNS: &str = "id, seq, user_id, content, media_urls, post_type, created_at";

/// Shared projection for viewer-facing post queries. `$1` is always the
/// viewer; authors are LEFT JOINed because removed users orphan their posts.
const FEED_SELECT: &str = r#"
    SELECT p.id, p.content, p.media_urls, p.post_type, p.created_at,
           u.id AS author_id, u.full_name AS author_name,
           u.username AS author_username, u.profile_picture AS author_picture,
           (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count,
           (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count,
           EXISTS(SELECT 1 FROM likes l WHERE l.post_id = p.id AND l.user_id = $1) AS liked,
           EXISTS(SELECT 1 FROM bookmarks b WHERE b.post_id = p.id AND b.user_id = $1) AS saved
    FROM posts p
    LEFT JOIN users u ON u.id = p.user_id
"#;

fn row_to_feed_post(row: &PgRow) -> FeedPost {
    let author = row
        .get::<Option<Uuid>, _>("author_id")
        .map(|id| UserSummary {
            id,
            full_name: row.get::<Option<String>, _>("author_name").unwrap_or_default(),
            username: row.get("author_username"),
            profile_picture: row
                .get::<Option<String>, _>("author_picture")
                .unwrap_or_default(),
        });

    FeedPost {
        id: row.get("id"),
        author,
        content: row.get("content"),
        media_urls: row.get::<Json<Vec<String>>, _>("media_urls").0,
        post_type: row.get("post_type"),
        like_count: row.get("like_count"),
        comment_count: row.get("comment_count"),
        liked: row.get("liked"),
        saved: row.get("saved"),
        created_at: row.get("created_at"),
    }
}

pub async fn insert_post(
    pool: &PgPool,
    user_id: Uuid,
    content: Option<&str>,
    media_urls: &[String],
    post_type: &str,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!(
        r#"
        INSERT INTO posts (id, user_id, content, media_urls, post_type)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {POST_COLUMNS}
        "#,
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(content)
    .bind(Json(media_urls.to_vec()))
    .bind(post_type)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, post_id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
        .bind(post_id)
        .fetch_optional(pool)
        .await
}

/// Delete a post; likes, comments and bookmarks cascade with the row.
pub async fn delete_post(pool: &PgPool, post_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// The home feed: the viewer's own posts plus everyone they follow,
/// newest first, created_at ties broken by insertion order.
pub async fn feed_for(pool: &PgPool, viewer_id: Uuid) -> Result<Vec<FeedPost>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        {FEED_SELECT}
        WHERE p.user_id = $1
           OR p.user_id IN (SELECT followee_id FROM follows WHERE follower_id = $1)
        ORDER BY p.created_at DESC, p.seq ASC
        "#,
    ))
    .bind(viewer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_feed_post).collect())
}

/// A single post as seen by a viewer.
pub async fn feed_post_by_id(
    pool: &PgPool,
    viewer_id: Uuid,
    post_id: Uuid,
) -> Result<Option<FeedPost>, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        {FEED_SELECT}
        WHERE p.id = $2
        "#,
    ))
    .bind(viewer_id)
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(row_to_feed_post))
}

/// One user's posts as seen by a viewer.
pub async fn posts_by_user(
    pool: &PgPool,
    viewer_id: Uuid,
    owner_id: Uuid,
) -> Result<Vec<FeedPost>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        {FEED_SELECT}
        WHERE p.user_id = $2
        ORDER BY p.created_at DESC, p.seq ASC
        "#,
    ))
    .bind(viewer_id)
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_feed_post).collect())
}

/// Posts the viewer has saved, most recently saved first.
pub async fn saved_by_user(pool: &PgPool, viewer_id: Uuid) -> Result<Vec<FeedPost>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        {FEED_SELECT}
        JOIN bookmarks bm ON bm.post_id = p.id AND bm.user_id = $1
        ORDER BY bm.created_at DESC
        "#,
    ))
    .bind(viewer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_feed_post).collect())
}
