/// Database access layer
///
/// Repository functions over `&PgPool`, one module per aggregate. Set-valued
/// relations (follows, likes, bookmarks, story views, connections) are only
/// ever mutated through single atomic statements (`INSERT .. ON CONFLICT DO
/// NOTHING` / keyed `DELETE`), so concurrent actors cannot lose updates.
pub mod bookmark_repo;
pub mod comment_repo;
pub mod connection_repo;
pub mod follow_repo;
pub mod like_repo;
pub mod message_repo;
pub mod notification_repo;
pub mod post_repo;
pub mod story_repo;
pub mod user_repo;

/// Postgres unique_violation (23505).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
