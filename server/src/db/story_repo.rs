use crate::models::{Story, UserSummary};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

const STORY_COLUMNS: &str =
    "id, user_id, media_url, text, background, media_type, expires_at, created_at";

/// Drop whatever story the owner currently has; a user holds at most one.
pub async fn delete_stories_of(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let affected = sqlx::query("DELETE FROM stories WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected)
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_story(
    pool: &PgPool,
    user_id: Uuid,
    media_url: Option<&str>,
    text: Option<&str>,
    background: Option<&str>,
    media_type: &str,
    expires_at: DateTime<Utc>,
) -> Result<Story, sqlx::Error> {
    sqlx::query_as::<_, Story>(&format!(
        r#"
        INSERT INTO stories (id, user_id, media_url, text, background, media_type, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {STORY_COLUMNS}
        "#,
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(media_url)
    .bind(text)
    .bind(background)
    .bind(media_type)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

/// A story that has not yet expired.
pub async fn find_live(pool: &PgPool, story_id: Uuid) -> Result<Option<Story>, sqlx::Error> {
    sqlx::query_as::<_, Story>(&format!(
        "SELECT {STORY_COLUMNS} FROM stories WHERE id = $1 AND expires_at > NOW()",
    ))
    .bind(story_id)
    .fetch_optional(pool)
    .await
}

/// First view wins; returns true only for the first view by this user.
pub async fn insert_view(
    pool: &PgPool,
    story_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let inserted = sqlx::query_as::<_, (Uuid,)>(
        r#"
        INSERT INTO story_views (story_id, user_id, created_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (story_id, user_id) DO NOTHING
        RETURNING story_id
        "#,
    )
    .bind(story_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(inserted.is_some())
}

pub async fn viewers_of(pool: &PgPool, story_id: Uuid) -> Result<Vec<UserSummary>, sqlx::Error> {
    sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.id, u.full_name, u.username, u.profile_picture
        FROM story_views sv
        JOIN users u ON u.id = sv.user_id
        WHERE sv.story_id = $1
        ORDER BY sv.created_at ASC
        "#,
    )
    .bind(story_id)
    .fetch_all(pool)
    .await
}

/// Viewers for a batch of stories, grouped in one pass by the caller.
pub async fn viewers_for(
    pool: &PgPool,
    story_ids: &[Uuid],
) -> Result<Vec<(Uuid, UserSummary)>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT sv.story_id, u.id, u.full_name, u.username, u.profile_picture
        FROM story_views sv
        JOIN users u ON u.id = sv.user_id
        WHERE sv.story_id = ANY($1)
        ORDER BY sv.created_at ASC
        "#,
    )
    .bind(story_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| {
            (
                row.get::<Uuid, _>("story_id"),
                UserSummary {
                    id: row.get("id"),
                    full_name: row.get("full_name"),
                    username: row.get("username"),
                    profile_picture: row.get("profile_picture"),
                },
            )
        })
        .collect())
}

fn row_to_story(row: &PgRow) -> Story {
    Story {
        id: row.get("id"),
        user_id: row.get("user_id"),
        media_url: row.get("media_url"),
        text: row.get("text"),
        background: row.get("background"),
        media_type: row.get("media_type"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    }
}

/// Stories from followed users created inside the last 24 hours, newest
/// first. The window check backs up the scheduled expiry.
pub async fn feed_for(
    pool: &PgPool,
    viewer_id: Uuid,
) -> Result<Vec<(Story, Option<UserSummary>)>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT s.id, s.user_id, s.media_url, s.text, s.background, s.media_type,
               s.expires_at, s.created_at,
               u.id AS author_id, u.full_name AS author_name,
               u.username AS author_username, u.profile_picture AS author_picture
        FROM stories s
        LEFT JOIN users u ON u.id = s.user_id
        WHERE s.user_id IN (SELECT followee_id FROM follows WHERE follower_id = $1)
          AND s.created_at > NOW() - INTERVAL '24 hours'
          AND s.expires_at > NOW()
        ORDER BY s.created_at DESC
        "#,
    )
    .bind(viewer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| {
            let author = row
                .get::<Option<Uuid>, _>("author_id")
                .map(|id| UserSummary {
                    id,
                    full_name: row
                        .get::<Option<String>, _>("author_name")
                        .unwrap_or_default(),
                    username: row.get("author_username"),
                    profile_picture: row
                        .get::<Option<String>, _>("author_picture")
                        .unwrap_or_default(),
                });
            (row_to_story(row), author)
        })
        .collect())
}

/// Deferred-expiry handler primitive: delete only if the story is still
/// there and actually past its expiry.
pub async fn delete_if_expired(pool: &PgPool, story_id: Uuid) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("DELETE FROM stories WHERE id = $1 AND expires_at <= NOW()")
        .bind(story_id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected > 0)
}
