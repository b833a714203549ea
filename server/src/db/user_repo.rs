use crate::models::{User, UserSummary};
use sqlx::{PgPool, Row};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, external_id, email, full_name, username, bio, location, \
     profile_picture, cover_photo, created_at, updated_at";

/// Insert a user synced from the identity provider.
/// Fails with a unique violation when the username is already taken.
pub async fn insert_user(
    pool: &PgPool,
    external_id: &str,
    email: Option<&str>,
    full_name: &str,
    username: &str,
    profile_picture: &str,
) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (id, external_id, email, full_name, username, profile_picture)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {USER_COLUMNS}
        "#,
    ))
    .bind(Uuid::new_v4())
    .bind(external_id)
    .bind(email)
    .bind(full_name)
    .bind(username)
    .bind(profile_picture)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_external_id(
    pool: &PgPool,
    external_id: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE external_id = $1",
    ))
    .bind(external_id)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1",
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1) AS taken")
        .bind(username)
        .fetch_one(pool)
        .await?;

    Ok(row.get::<bool, _>("taken"))
}

/// Patch profile fields chosen by the user; absent fields keep their value.
pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    full_name: Option<&str>,
    username: Option<&str>,
    bio: Option<&str>,
    location: Option<&str>,
    profile_picture: Option<&str>,
    cover_photo: Option<&str>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET full_name = COALESCE($2, full_name),
            username = COALESCE($3, username),
            bio = COALESCE($4, bio),
            location = COALESCE($5, location),
            profile_picture = COALESCE($6, profile_picture),
            cover_photo = COALESCE($7, cover_photo),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#,
    ))
    .bind(user_id)
    .bind(full_name)
    .bind(username)
    .bind(bio)
    .bind(location)
    .bind(profile_picture)
    .bind(cover_photo)
    .fetch_one(pool)
    .await
}

/// Last-write-wins patch applied from identity provider update events.
pub async fn sync_identity(
    pool: &PgPool,
    external_id: &str,
    email: Option<&str>,
    full_name: Option<&str>,
    username: Option<&str>,
    profile_picture: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET email = COALESCE($2, email),
            full_name = COALESCE($3, full_name),
            username = COALESCE($4, username),
            profile_picture = COALESCE($5, profile_picture),
            updated_at = NOW()
        WHERE external_id = $1
        RETURNING {USER_COLUMNS}
        "#,
    ))
    .bind(external_id)
    .bind(email)
    .bind(full_name)
    .bind(username)
    .bind(profile_picture)
    .fetch_optional(pool)
    .await
}

/// Remove the user record. Owned posts and messages are left in place.
pub async fn delete_by_external_id(
    pool: &PgPool,
    external_id: &str,
) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("DELETE FROM users WHERE external_id = $1")
        .bind(external_id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected > 0)
}

/// Case-insensitive substring search over handle and display name.
pub async fn search(pool: &PgPool, keyword: &str) -> Result<Vec<UserSummary>, sqlx::Error> {
    let pattern = format!("%{}%", keyword);

    sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT id, full_name, username, profile_picture
        FROM users
        WHERE username ILIKE $1 OR full_name ILIKE $1
        ORDER BY username
        LIMIT 50
        "#,
    )
    .bind(pattern)
    .fetch_all(pool)
    .await
}

/// Users the caller might want to reach: everyone except themselves, the
/// people they already follow, and their accepted connections.
pub async fn discover(pool: &PgPool, user_id: Uuid) -> Result<Vec<UserSummary>, sqlx::Error> {
    sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT id, full_name, username, profile_picture
        FROM users u
        WHERE u.id <> $1
          AND NOT EXISTS (
              SELECT 1 FROM follows f WHERE f.follower_id = $1 AND f.followee_id = u.id
          )
          AND NOT EXISTS (
              SELECT 1 FROM connections c WHERE c.user_id = $1 AND c.peer_id = u.id
          )
        ORDER BY u.created_at DESC
        LIMIT 50
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
