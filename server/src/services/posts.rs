use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{bookmark_repo, comment_repo, like_repo, post_repo, user_repo};
use crate::error::{AppError, Result};
use crate::models::{
    CommentView, FeedPost, NotificationKind, Post, PostType, UserSummary,
};
use crate::realtime::{ConnectionManager, LiveEvent};
use crate::services::notifications::{NotificationRefs, NotificationService};

/// Like-state returned by a toggle: where the flip landed and the count
/// after it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub like_count: i64,
}

/// Posts and the membership sets hanging off them.
#[derive(Clone)]
pub struct PostService {
    pool: PgPool,
    notifications: NotificationService,
    live: ConnectionManager,
}

impl PostService {
    pub fn new(pool: PgPool, notifications: NotificationService, live: ConnectionManager) -> Self {
        Self {
            pool,
            notifications,
            live,
        }
    }

    async fn require_post(&self, post_id: Uuid) -> Result<Post> {
        post_repo::find_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("post not found".to_string()))
    }

    /// A post needs text or media; the type tag is derived, not chosen.
    pub async fn create_post(
        &self,
        owner: Uuid,
        content: Option<String>,
        media_urls: Vec<String>,
    ) -> Result<Post> {
        let content = content.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        let post_type = PostType::from_parts(content.is_some(), !media_urls.is_empty())
            .ok_or_else(|| {
                AppError::InvalidOperation("a post needs text or media".to_string())
            })?;

        Ok(post_repo::insert_post(
            &self.pool,
            owner,
            content.as_deref(),
            &media_urls,
            post_type.as_str(),
        )
        .await?)
    }

    /// Membership flip on the like set. Never errors on repeated calls;
    /// only the transition into liked notifies the owner.
    pub async fn toggle_like(&self, actor: Uuid, post_id: Uuid) -> Result<LikeState> {
        let post = self.require_post(post_id).await?;

        let liked = like_repo::insert_like(&self.pool, post_id, actor).await?;
        if liked {
            let notification = self
                .notifications
                .notify(
                    actor,
                    post.user_id,
                    NotificationKind::Like,
                    NotificationRefs::post(post_id),
                    "liked your post",
                )
                .await?;
            if let Some(notification) = notification {
                self.live
                    .push(post.user_id, LiveEvent::Notification { notification })
                    .await;
            }
        } else {
            like_repo::delete_like(&self.pool, post_id, actor).await?;
        }

        let like_count = like_repo::count_for_post(&self.pool, post_id).await?;
        Ok(LikeState { liked, like_count })
    }

    /// Append to the ordered comment list and tell everyone looking.
    pub async fn add_comment(
        &self,
        actor: Uuid,
        post_id: Uuid,
        content: &str,
    ) -> Result<CommentView> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::InvalidOperation(
                "a comment cannot be empty".to_string(),
            ));
        }
        let post = self.require_post(post_id).await?;

        let comment = comment_repo::insert_comment(&self.pool, post_id, actor, content).await?;

        let notification = self
            .notifications
            .notify(
                actor,
                post.user_id,
                NotificationKind::Comment,
                NotificationRefs::post(post_id),
                "commented on your post",
            )
            .await?;
        if let Some(notification) = notification {
            self.live
                .push(post.user_id, LiveEvent::Notification { notification })
                .await;
        }

        // Everyone currently looking at the post gets the new comment.
        self.live
            .broadcast(LiveEvent::PostCommented {
                post_id,
                comment: comment.clone(),
            })
            .await;

        let author = user_repo::find_by_id(&self.pool, actor)
            .await?
            .as_ref()
            .map(UserSummary::from);

        Ok(CommentView { comment, author })
    }

    /// Membership flip on the actor's saved set; deliberately silent.
    pub async fn toggle_save(&self, actor: Uuid, post_id: Uuid) -> Result<bool> {
        self.require_post(post_id).await?;

        let saved = bookmark_repo::insert_bookmark(&self.pool, actor, post_id).await?;
        if !saved {
            bookmark_repo::delete_bookmark(&self.pool, actor, post_id).await?;
        }

        Ok(saved)
    }

    /// Owner-only. Likes, comments and bookmarks go with the post.
    pub async fn delete_post(&self, actor: Uuid, post_id: Uuid) -> Result<()> {
        let post = self.require_post(post_id).await?;
        if post.user_id != actor {
            return Err(AppError::Forbidden(
                "only the owner can delete a post".to_string(),
            ));
        }

        Ok(post_repo::delete_post(&self.pool, post_id).await?)
    }

    pub async fn get_post(&self, viewer: Uuid, post_id: Uuid) -> Result<FeedPost> {
        post_repo::feed_post_by_id(&self.pool, viewer, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("post not found".to_string()))
    }

    pub async fn comments(&self, post_id: Uuid) -> Result<Vec<CommentView>> {
        self.require_post(post_id).await?;
        Ok(comment_repo::list_for_post(&self.pool, post_id).await?)
    }

    pub async fn likers(&self, post_id: Uuid) -> Result<Vec<UserSummary>> {
        self.require_post(post_id).await?;
        Ok(like_repo::likers_of(&self.pool, post_id).await?)
    }

    /// A profile's posts, as seen by the viewer.
    pub async fn posts_of(&self, viewer: Uuid, username: &str) -> Result<Vec<FeedPost>> {
        let owner = user_repo::find_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

        Ok(post_repo::posts_by_user(&self.pool, viewer, owner.id).await?)
    }

    pub async fn saved_posts(&self, viewer: Uuid) -> Result<Vec<FeedPost>> {
        Ok(post_repo::saved_by_user(&self.pool, viewer).await?)
    }
}
