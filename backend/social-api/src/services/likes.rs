/// Like service - one like per (user, post), author notified on like
use crate::domain::{Like, NotificationVerb, Post};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::repository::{LikeRepository, PostRepository};
use crate::services::NotificationService;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct LikeService {
    posts: Arc<dyn PostRepository>,
    likes: Arc<dyn LikeRepository>,
    notifications: Arc<NotificationService>,
}

impl LikeService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        likes: Arc<dyn LikeRepository>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            posts,
            likes,
            notifications,
        }
    }

    async fn require_post(&self, post_id: Uuid) -> Result<Post> {
        self.posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("post".to_string()))
    }

    /// A repeated like is rejected, never duplicated
    pub async fn like(&self, user_id: Uuid, post_id: Uuid) -> Result<Like> {
        let post = self.require_post(post_id).await?;
        let notification =
            self.notifications
                .draft(post.author_id, user_id, NotificationVerb::Like, post.id);

        let (like, notification) = self
            .likes
            .create_like(user_id, post_id, notification)
            .await?
            .ok_or_else(|| AppError::Conflict("You have already liked this post".to_string()))?;

        metrics::record_engagement("like");
        info!(post_id = %post_id, user_id = %user_id, "post liked");
        if let Some(notification) = &notification {
            self.notifications.record(notification);
        }
        Ok(like)
    }

    pub async fn unlike(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        self.require_post(post_id).await?;

        if !self.likes.delete_like(user_id, post_id).await? {
            return Err(AppError::Conflict(
                "You have not liked this post".to_string(),
            ));
        }

        metrics::record_engagement("unlike");
        info!(post_id = %post_id, user_id = %user_id, "post unliked");
        Ok(())
    }

    pub async fn like_count(&self, post_id: Uuid) -> Result<i64> {
        self.likes.get_like_count(post_id).await
    }
}
