use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::clients::{EmailSender, TaskScheduler};
use crate::db::{connection_repo, follow_repo, user_repo};
use crate::error::{AppError, Result};
use crate::jobs::TaskKind;
use crate::models::{NotificationKind, Relationships, User};
use crate::services::notifications::{NotificationRefs, NotificationService};

/// A sender may create at most this many requests per rolling window.
pub const CONNECTION_REQUEST_LIMIT: i64 = 20;
pub const CONNECTION_REQUEST_WINDOW_HOURS: i64 = 24;
/// How long a request may sit pending before the target is nudged.
const CONNECTION_REMINDER_DELAY_HOURS: i64 = 24;

/// Start of the rolling rate-limit window.
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(CONNECTION_REQUEST_WINDOW_HOURS)
}

/// True once the sender has exhausted the window's budget.
pub fn over_request_limit(requests_in_window: i64) -> bool {
    requests_in_window >= CONNECTION_REQUEST_LIMIT
}

/// Outcome of a connection request that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// A new pending request was created
    Requested,
    /// A request between the pair is already pending
    AlreadyPending,
}

/// Follow edges, accepted connections, and the request state machine.
#[derive(Clone)]
pub struct GraphService {
    pool: PgPool,
    notifications: NotificationService,
    email: Arc<dyn EmailSender>,
    scheduler: Arc<dyn TaskScheduler>,
}

impl GraphService {
    pub fn new(
        pool: PgPool,
        notifications: NotificationService,
        email: Arc<dyn EmailSender>,
        scheduler: Arc<dyn TaskScheduler>,
    ) -> Self {
        Self {
            pool,
            notifications,
            email,
            scheduler,
        }
    }

    async fn require_user(&self, user_id: Uuid) -> Result<User> {
        user_repo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))
    }

    /// Returns true on the transition into following; re-follows are
    /// no-op successes and never notify again.
    pub async fn follow(&self, actor: Uuid, target: Uuid) -> Result<bool> {
        if actor == target {
            return Err(AppError::InvalidOperation(
                "you cannot follow yourself".to_string(),
            ));
        }
        self.require_user(target).await?;

        let followed = follow_repo::insert_follow(&self.pool, actor, target).await?;
        if followed {
            self.notifications
                .notify(
                    actor,
                    target,
                    NotificationKind::Follow,
                    NotificationRefs::none(),
                    "started following you",
                )
                .await?;
        }

        Ok(followed)
    }

    /// Symmetric removal; removing an absent edge is a no-op success.
    pub async fn unfollow(&self, actor: Uuid, target: Uuid) -> Result<bool> {
        if actor == target {
            return Err(AppError::InvalidOperation(
                "you cannot unfollow yourself".to_string(),
            ));
        }

        Ok(follow_repo::delete_follow(&self.pool, actor, target).await?)
    }

    /// Create (or report) a connection request toward the target.
    pub async fn request_connection(
        &self,
        actor: Uuid,
        target: Uuid,
    ) -> Result<ConnectionOutcome> {
        if actor == target {
            return Err(AppError::InvalidOperation(
                "you cannot connect with yourself".to_string(),
            ));
        }
        let target_user = self.require_user(target).await?;

        let sent_in_window = connection_repo::count_requests_since(
            &self.pool,
            actor,
            window_start(Utc::now()),
        )
        .await?;
        if over_request_limit(sent_in_window) {
            return Err(AppError::RateLimited(format!(
                "you have sent more than {CONNECTION_REQUEST_LIMIT} connection requests in the last {CONNECTION_REQUEST_WINDOW_HOURS} hours"
            )));
        }

        if let Some(existing) = connection_repo::find_between(&self.pool, actor, target).await? {
            if existing.is_accepted() {
                return Err(AppError::Conflict(
                    "you are already connected with this user".to_string(),
                ));
            }
            return Ok(ConnectionOutcome::AlreadyPending);
        }

        let request = connection_repo::insert_request(&self.pool, actor, target).await?;

        // Reminder fires only if the request is still pending at run time.
        let run_at = Utc::now() + Duration::hours(CONNECTION_REMINDER_DELAY_HOURS);
        if let Err(err) = self
            .scheduler
            .schedule(
                TaskKind::ConnectionReminder,
                json!({ "request_id": request.id }),
                run_at,
            )
            .await
        {
            warn!(request_id = %request.id, error = %err, "failed to schedule connection reminder");
        }

        if let Some(email) = target_user.email.as_deref() {
            let requester = self.require_user(actor).await?;
            let body = format!(
                "{} wants to connect with you on LinkUp.",
                requester.full_name
            );
            if let Err(err) = self
                .email
                .send(email, "New connection request", &body)
                .await
            {
                warn!(request_id = %request.id, error = %err, "connection request email failed");
            }
        }

        Ok(ConnectionOutcome::Requested)
    }

    /// Accept a request from `requester`. Both connection sets gain the
    /// other user; re-accepting re-adds nothing and stays quiet.
    pub async fn accept_connection(&self, actor: Uuid, requester: Uuid) -> Result<()> {
        let request = connection_repo::find_from(&self.pool, requester, actor)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("no connection request from this user".to_string())
            })?;

        connection_repo::insert_connection(&self.pool, actor, requester).await?;
        connection_repo::insert_connection(&self.pool, requester, actor).await?;
        if request.is_pending() {
            connection_repo::mark_accepted(&self.pool, request.id).await?;
        }

        Ok(())
    }

    /// Pure read of everything relationship-shaped around one user.
    pub async fn relationships(&self, user_id: Uuid) -> Result<Relationships> {
        let followers = follow_repo::followers_of(&self.pool, user_id).await?;
        let following = follow_repo::following_of(&self.pool, user_id).await?;
        let connections = connection_repo::connections_of(&self.pool, user_id).await?;
        let pending_requests = connection_repo::pending_incoming(&self.pool, user_id).await?;

        Ok(Relationships {
            followers,
            following,
            connections,
            pending_requests,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_is_a_trailing_day() {
        let now = Utc::now();
        assert_eq!(now - window_start(now), Duration::hours(24));
    }

    #[test]
    fn test_limit_allows_twenty_per_window() {
        // The check runs before insert, so the Nth call sees N-1 rows.
        assert!(!over_request_limit(19));
        assert!(over_request_limit(20));
    }
}
