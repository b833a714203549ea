use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::{post_repo, story_repo};
use crate::error::Result;
use crate::models::{FeedPost, StoryView, UserSummary};

/// Assembles viewer-scoped feeds. Every call re-queries from scratch;
/// there is no server-side cursor to invalidate.
#[derive(Clone)]
pub struct FeedService {
    pool: PgPool,
}

/// One pass over (story_id, viewer) pairs into per-story viewer lists,
/// preserving the pairs' order within each story.
pub fn group_viewers(pairs: Vec<(Uuid, UserSummary)>) -> HashMap<Uuid, Vec<UserSummary>> {
    let mut grouped: HashMap<Uuid, Vec<UserSummary>> = HashMap::new();
    for (story_id, viewer) in pairs {
        grouped.entry(story_id).or_default().push(viewer);
    }
    grouped
}

impl FeedService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The home feed: posts from followed users plus the viewer's own,
    /// newest first, ties in insertion order.
    pub async fn assemble_feed(&self, viewer: Uuid) -> Result<Vec<FeedPost>> {
        Ok(post_repo::feed_for(&self.pool, viewer).await?)
    }

    /// Live stories from followed users, newest first, with viewer lists
    /// attached in one batch.
    pub async fn assemble_story_feed(&self, viewer: Uuid) -> Result<Vec<StoryView>> {
        let stories = story_repo::feed_for(&self.pool, viewer).await?;

        let story_ids: Vec<Uuid> = stories.iter().map(|(story, _)| story.id).collect();
        let mut viewers = group_viewers(story_repo::viewers_for(&self.pool, &story_ids).await?);

        Ok(stories
            .into_iter()
            .map(|(story, author)| {
                let viewers = viewers.remove(&story.id).unwrap_or_default();
                StoryView {
                    story,
                    author,
                    viewers,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str) -> UserSummary {
        UserSummary {
            id: Uuid::new_v4(),
            full_name: name.to_string(),
            username: Some(name.to_string()),
            profile_picture: String::new(),
        }
    }

    #[test]
    fn test_group_viewers_preserves_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let pairs = vec![
            (a, summary("first")),
            (b, summary("other")),
            (a, summary("second")),
        ];

        let grouped = group_viewers(pairs);
        let for_a = &grouped[&a];
        assert_eq!(for_a.len(), 2);
        assert_eq!(for_a[0].full_name, "first");
        assert_eq!(for_a[1].full_name, "second");
        assert_eq!(grouped[&b].len(), 1);
    }

    #[test]
    fn test_group_viewers_empty() {
        let grouped = group_viewers(Vec::new());
        assert!(grouped.is_empty());
    }
}
