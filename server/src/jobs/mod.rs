/// Deferred-task handlers
///
/// Tasks are enqueued through the workflow engine with an id-only payload
/// and come back through `POST /jobs/dispatch`. Every handler re-reads
/// current state before acting: the world may have changed between enqueue
/// and run, and the engine may deliver more than once.
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::db::{connection_repo, message_repo, story_repo, user_repo};
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Delete a story once its 24h lifetime is over
    StoryExpire,
    /// Nudge the target of a connection request still pending after 24h
    ConnectionReminder,
    /// Daily unseen-message email digest
    MessagesDigest,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::StoryExpire => "story.expire",
            TaskKind::ConnectionReminder => "connection.reminder",
            TaskKind::MessagesDigest => "messages.digest",
        }
    }
}

impl TryFrom<&str> for TaskKind {
    type Error = AppError;

    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        match s {
            "story.expire" => Ok(TaskKind::StoryExpire),
            "connection.reminder" => Ok(TaskKind::ConnectionReminder),
            "messages.digest" => Ok(TaskKind::MessagesDigest),
            other => Err(AppError::InvalidOperation(format!(
                "unknown task kind '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoryExpirePayload {
    pub story_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectionReminderPayload {
    pub request_id: Uuid,
}

/// Entry point for the workflow engine's callback.
pub async fn dispatch(
    state: &AppState,
    kind: TaskKind,
    payload: serde_json::Value,
) -> Result<serde_json::Value> {
    match kind {
        TaskKind::StoryExpire => expire_story(state, payload).await,
        TaskKind::ConnectionReminder => remind_connection(state, payload).await,
        TaskKind::MessagesDigest => send_unseen_digest(state).await,
    }
}

async fn expire_story(state: &AppState, payload: serde_json::Value) -> Result<serde_json::Value> {
    let payload: StoryExpirePayload = serde_json::from_value(payload)
        .map_err(|e| AppError::InvalidOperation(format!("bad story.expire payload: {e}")))?;

    // A story replaced since enqueue has a different id and is simply gone.
    let deleted = story_repo::delete_if_expired(&state.pool, payload.story_id).await?;
    if !deleted {
        tracing::debug!(story_id = %payload.story_id, "story already gone or not yet expired");
    }

    Ok(json!({ "deleted": deleted }))
}

async fn remind_connection(
    state: &AppState,
    payload: serde_json::Value,
) -> Result<serde_json::Value> {
    let payload: ConnectionReminderPayload = serde_json::from_value(payload)
        .map_err(|e| AppError::InvalidOperation(format!("bad connection.reminder payload: {e}")))?;

    let Some(request) = connection_repo::find_by_id(&state.pool, payload.request_id).await? else {
        return Ok(json!({ "reminded": false }));
    };

    // Accepted before the reminder fired: stay quiet.
    if !request.is_pending() {
        return Ok(json!({ "reminded": false }));
    }

    let requester = user_repo::find_by_id(&state.pool, request.from_user_id).await?;
    let target = user_repo::find_by_id(&state.pool, request.to_user_id).await?;
    let (Some(requester), Some(target)) = (requester, target) else {
        return Ok(json!({ "reminded": false }));
    };
    let Some(email) = target.email.as_deref() else {
        return Ok(json!({ "reminded": false }));
    };

    let body = format!(
        "{} is waiting for you to accept their connection request on LinkUp.",
        requester.full_name
    );
    if let Err(err) = state
        .email
        .send(email, "You have a pending connection request", &body)
        .await
    {
        tracing::warn!(request_id = %request.id, error = %err, "reminder email failed");
        return Ok(json!({ "reminded": false }));
    }

    Ok(json!({ "reminded": true }))
}

async fn send_unseen_digest(state: &AppState) -> Result<serde_json::Value> {
    let counts = message_repo::unseen_counts(&state.pool).await?;

    let mut sent = 0u64;
    for (user_id, email, unseen) in counts {
        let Some(email) = email else { continue };
        let body = format!("You have {unseen} unseen message(s) waiting for you on LinkUp.");
        match state
            .email
            .send(&email, "Unseen messages on LinkUp", &body)
            .await
        {
            Ok(()) => sent += 1,
            Err(err) => {
                tracing::warn!(user_id = %user_id, error = %err, "digest email failed");
            }
        }
    }

    Ok(json!({ "sent": sent }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_kind_round_trip() {
        for kind in [
            TaskKind::StoryExpire,
            TaskKind::ConnectionReminder,
            TaskKind::MessagesDigest,
        ] {
            assert_eq!(TaskKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(TaskKind::try_from("story.archive").is_err());
    }
}
