use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::clients::{MediaKind, TaskScheduler};
use crate::db::{story_repo, user_repo};
use crate::error::{AppError, Result};
use crate::jobs::TaskKind;
use crate::models::{Story, StoryView, UserSummary};

pub const STORY_TTL_HOURS: i64 = 24;

/// Story lifecycle: one live story per owner, gone after 24 hours.
#[derive(Clone)]
pub struct StoryService {
    pool: PgPool,
    scheduler: Arc<dyn TaskScheduler>,
}

impl StoryService {
    pub fn new(pool: PgPool, scheduler: Arc<dyn TaskScheduler>) -> Self {
        Self { pool, scheduler }
    }

    /// Replace whatever story the owner had with the new one and schedule
    /// its expiry. The expiry task carries only the new story's id, so a
    /// story replaced again before it fires is a harmless no-op.
    pub async fn create_story(
        &self,
        owner: Uuid,
        media: Option<(String, MediaKind)>,
        text: Option<String>,
        background: Option<String>,
    ) -> Result<Story> {
        let text = text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        if media.is_none() && text.is_none() {
            return Err(AppError::InvalidOperation(
                "a story needs media or text".to_string(),
            ));
        }

        let (media_url, media_type) = match &media {
            Some((url, kind)) => (Some(url.as_str()), kind.as_str()),
            None => (None, "text"),
        };

        let replaced = story_repo::delete_stories_of(&self.pool, owner).await?;
        if replaced > 0 {
            tracing::debug!(user_id = %owner, "replaced previous story");
        }

        let expires_at = Utc::now() + Duration::hours(STORY_TTL_HOURS);
        let story = story_repo::insert_story(
            &self.pool,
            owner,
            media_url,
            text.as_deref(),
            background.as_deref(),
            media_type,
            expires_at,
        )
        .await?;

        if let Err(err) = self
            .scheduler
            .schedule(
                TaskKind::StoryExpire,
                json!({ "story_id": story.id }),
                expires_at,
            )
            .await
        {
            warn!(story_id = %story.id, error = %err, "failed to schedule story expiry");
        }

        Ok(story)
    }

    /// Record a view (first view wins) and return the story with its
    /// author and viewer list.
    pub async fn view_story(&self, actor: Uuid, story_id: Uuid) -> Result<StoryView> {
        let story = story_repo::find_live(&self.pool, story_id)
            .await?
            .ok_or_else(|| AppError::NotFound("story not found".to_string()))?;

        story_repo::insert_view(&self.pool, story_id, actor).await?;

        let author = user_repo::find_by_id(&self.pool, story.user_id)
            .await?
            .as_ref()
            .map(UserSummary::from);
        let viewers = story_repo::viewers_of(&self.pool, story_id).await?;

        Ok(StoryView {
            story,
            author,
            viewers,
        })
    }
}
