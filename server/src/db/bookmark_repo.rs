use sqlx::PgPool;
use uuid::Uuid;

/// Add-if-absent; returns true if the bookmark was newly created.
pub async fn insert_bookmark(
    pool: &PgPool,
    user_id: Uuid,
    post_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let inserted = sqlx::query_as::<_, (Uuid,)>(
        r#"
        INSERT INTO bookmarks (user_id, post_id, created_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (user_id, post_id) DO NOTHING
        RETURNING post_id
        "#,
    )
    .bind(user_id)
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    Ok(inserted.is_some())
}

/// Remove-if-present; returns true if a bookmark was removed.
pub async fn delete_bookmark(
    pool: &PgPool,
    user_id: Uuid,
    post_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND post_id = $2")
        .bind(user_id)
        .bind(post_id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected > 0)
}
