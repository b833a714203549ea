use crate::models::{ConnectionRequest, PendingRequest, UserSummary};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

const REQUEST_COLUMNS: &str = "id, from_user_id, to_user_id, status, created_at";

/// Find a request between the unordered pair, newest first.
pub async fn find_between(
    pool: &PgPool,
    a: Uuid,
    b: Uuid,
) -> Result<Option<ConnectionRequest>, sqlx::Error> {
    sqlx::query_as::<_, ConnectionRequest>(&format!(
        r#"
        SELECT {REQUEST_COLUMNS}
        FROM connection_requests
        WHERE (from_user_id = $1 AND to_user_id = $2)
           OR (from_user_id = $2 AND to_user_id = $1)
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    ))
    .bind(a)
    .bind(b)
    .fetch_optional(pool)
    .await
}

/// Requests created by a sender inside the rolling rate-limit window.
pub async fn count_requests_since(
    pool: &PgPool,
    from_user_id: Uuid,
    since: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        "SELECT COUNT(*) AS count FROM connection_requests \
         WHERE from_user_id = $1 AND created_at >= $2",
    )
    .bind(from_user_id)
    .bind(since)
    .fetch_one(pool)
    .await?;

    Ok(row.get::<i64, _>("count"))
}

pub async fn insert_request(
    pool: &PgPool,
    from_user_id: Uuid,
    to_user_id: Uuid,
) -> Result<ConnectionRequest, sqlx::Error> {
    sqlx::query_as::<_, ConnectionRequest>(&format!(
        r#"
        INSERT INTO connection_requests (id, from_user_id, to_user_id, status)
        VALUES ($1, $2, $3, 'pending')
        RETURNING {REQUEST_COLUMNS}
        "#,
    ))
    .bind(Uuid::new_v4())
    .bind(from_user_id)
    .bind(to_user_id)
    .fetch_one(pool)
    .await
}

/// The newest request in one direction, whatever its status.
pub async fn find_from(
    pool: &PgPool,
    from_user_id: Uuid,
    to_user_id: Uuid,
) -> Result<Option<ConnectionRequest>, sqlx::Error> {
    sqlx::query_as::<_, ConnectionRequest>(&format!(
        r#"
        SELECT {REQUEST_COLUMNS}
        FROM connection_requests
        WHERE from_user_id = $1 AND to_user_id = $2
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    ))
    .bind(from_user_id)
    .bind(to_user_id)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(
    pool: &PgPool,
    request_id: Uuid,
) -> Result<Option<ConnectionRequest>, sqlx::Error> {
    sqlx::query_as::<_, ConnectionRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM connection_requests WHERE id = $1",
    ))
    .bind(request_id)
    .fetch_optional(pool)
    .await
}

/// Flip a request to accepted; the row is kept, never deleted.
pub async fn mark_accepted(pool: &PgPool, request_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE connection_requests SET status = 'accepted' WHERE id = $1")
        .bind(request_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Add-if-absent on the symmetric connection set; double accept is a no-op.
pub async fn insert_connection(
    pool: &PgPool,
    user_id: Uuid,
    peer_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let inserted = sqlx::query_as::<_, (Uuid,)>(
        r#"
        INSERT INTO connections (user_id, peer_id, created_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (user_id, peer_id) DO NOTHING
        RETURNING user_id
        "#,
    )
    .bind(user_id)
    .bind(peer_id)
    .fetch_optional(pool)
    .await?;

    Ok(inserted.is_some())
}

pub async fn connections_of(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<UserSummary>, sqlx::Error> {
    sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.id, u.full_name, u.username, u.profile_picture
        FROM connections c
        JOIN users u ON u.id = c.peer_id
        WHERE c.user_id = $1
        ORDER BY c.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Pending requests addressed to a user, resolved to requester profiles.
pub async fn pending_incoming(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<PendingRequest>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT r.id AS request_id, r.created_at,
               u.id AS requester_id, u.full_name, u.username, u.profile_picture
        FROM connection_requests r
        JOIN users u ON u.id = r.from_user_id
        WHERE r.to_user_id = $1 AND r.status = 'pending'
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| PendingRequest {
            request_id: row.get("request_id"),
            requester: UserSummary {
                id: row.get("requester_id"),
                full_name: row.get("full_name"),
                username: row.get("username"),
                profile_picture: row.get("profile_picture"),
            },
            created_at: row.get("created_at"),
        })
        .collect())
}
