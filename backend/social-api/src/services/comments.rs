/// Comment service - handles comment creation, retrieval, and management
use crate::domain::requests::CommentBody;
use crate::domain::{Comment, NotificationVerb, Page, PageRequest, Post};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::middleware::check_comment_ownership;
use crate::repository::{CommentRepository, PostRepository};
use crate::services::NotificationService;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

pub struct CommentService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    notifications: Arc<NotificationService>,
}

impl CommentService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            posts,
            comments,
            notifications,
        }
    }

    async fn require_post(&self, post_id: Uuid) -> Result<Post> {
        self.posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("post".to_string()))
    }

    async fn require_comment(&self, comment_id: Uuid) -> Result<Comment> {
        self.comments
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("comment".to_string()))
    }

    /// Comment on a post. The post's author is notified unless they wrote
    /// the comment themselves.
    pub async fn add_comment(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        body: CommentBody,
    ) -> Result<Comment> {
        body.validate()?;
        let post = self.require_post(post_id).await?;
        let notification =
            self.notifications
                .draft(post.author_id, author_id, NotificationVerb::Comment, post.id);

        let (comment, notification) = self
            .comments
            .create_comment(post_id, author_id, &body.content, notification)
            .await?;

        metrics::record_engagement("comment");
        info!(comment_id = %comment.id, post_id = %post_id, author_id = %author_id, "comment created");
        if let Some(notification) = &notification {
            self.notifications.record(notification);
        }
        Ok(comment)
    }

    pub async fn get_comment(&self, comment_id: Uuid) -> Result<Comment> {
        self.require_comment(comment_id).await
    }

    /// Oldest first; `post_id = None` lists comments across all posts
    pub async fn list_comments(
        &self,
        post_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Page<Comment>> {
        if let Some(post_id) = post_id {
            self.require_post(post_id).await?;
        }

        let (items, total) = self
            .comments
            .list_comments(post_id, page.limit(), page.offset())
            .await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn update_comment(
        &self,
        actor_id: Uuid,
        comment_id: Uuid,
        body: CommentBody,
    ) -> Result<Comment> {
        body.validate()?;
        let comment = self.require_comment(comment_id).await?;
        check_comment_ownership(actor_id, &comment)?;

        let updated = self
            .comments
            .update_comment(comment_id, &body.content)
            .await?
            .ok_or_else(|| AppError::NotFound("comment".to_string()))?;

        info!(comment_id = %comment_id, "comment updated");
        Ok(updated)
    }

    pub async fn delete_comment(&self, actor_id: Uuid, comment_id: Uuid) -> Result<()> {
        let comment = self.require_comment(comment_id).await?;
        check_comment_ownership(actor_id, &comment)?;

        if !self.comments.delete_comment(comment_id).await? {
            return Err(AppError::NotFound("comment".to_string()));
        }

        info!(comment_id = %comment_id, "comment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Repositories;
    use crate::services::test_support::seed_user;

    struct Fixture {
        repos: Repositories,
        notifications: Arc<NotificationService>,
        service: CommentService,
    }

    fn fixture() -> Fixture {
        let repos = Repositories::in_memory();
        let notifications = Arc::new(NotificationService::new(repos.notifications.clone()));
        let service = CommentService::new(
            repos.posts.clone(),
            repos.comments.clone(),
            notifications.clone(),
        );
        Fixture {
            repos,
            notifications,
            service,
        }
    }

    fn body(content: &str) -> CommentBody {
        CommentBody {
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_comment_on_others_post_notifies_author_once() {
        let fx = fixture();
        let alice = seed_user(&fx.repos, "alice").await;
        let bob = seed_user(&fx.repos, "bob").await;
        let post = fx.repos.posts.create_post(alice.id, "t", "c").await.unwrap();

        fx.service.add_comment(bob.id, post.id, body("nice")).await.unwrap();

        let stats = fx.notifications.stats(alice.id).await.unwrap();
        assert_eq!(stats.total_notifications, 1);
        assert_eq!(stats.unread_notifications, 1);

        let page = fx.notifications.list(alice.id, PageRequest::new(1)).await.unwrap();
        assert_eq!(page.items[0].verb, NotificationVerb::Comment);
        assert_eq!(page.items[0].actor_id, bob.id);
        assert_eq!(page.items[0].target_id, post.id);
    }

    #[tokio::test]
    async fn test_failed_notification_leaves_no_comment() {
        let fx = fixture();
        let bob = seed_user(&fx.repos, "bob").await;
        let post = fx.repos.posts.create_post(Uuid::new_v4(), "t", "c").await.unwrap();

        let result = fx.service.add_comment(bob.id, post.id, body("hello")).await;
        assert!(matches!(result, Err(AppError::Database(_))));

        let page = fx
            .service
            .list_comments(Some(post.id), PageRequest::new(1))
            .await
            .unwrap();
        assert_eq!(page.total_count, 0);
    }

    #[tokio::test]
    async fn test_comment_on_own_post_notifies_nobody() {
        let fx = fixture();
        let alice = seed_user(&fx.repos, "alice").await;
        let post = fx.repos.posts.create_post(alice.id, "t", "c").await.unwrap();

        fx.service.add_comment(alice.id, post.id, body("me")).await.unwrap();

        assert_eq!(fx.notifications.stats(alice.id).await.unwrap().total_notifications, 0);
    }

    #[tokio::test]
    async fn test_missing_post_and_blank_body() {
        let fx = fixture();
        let alice = seed_user(&fx.repos, "alice").await;

        assert!(matches!(
            fx.service.add_comment(alice.id, Uuid::new_v4(), body("hi")).await,
            Err(AppError::NotFound(_))
        ));

        let post = fx.repos.posts.create_post(alice.id, "t", "c").await.unwrap();
        assert!(matches!(
            fx.service.add_comment(alice.id, post.id, body("   ")).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_only_author_edits_comment() {
        let fx = fixture();
        let alice = seed_user(&fx.repos, "alice").await;
        let bob = seed_user(&fx.repos, "bob").await;
        let post = fx.repos.posts.create_post(alice.id, "t", "c").await.unwrap();
        let comment = fx.service.add_comment(bob.id, post.id, body("first")).await.unwrap();

        assert!(matches!(
            fx.service.update_comment(alice.id, comment.id, body("edited")).await,
            Err(AppError::Forbidden(_))
        ));
        let updated = fx
            .service
            .update_comment(bob.id, comment.id, body("edited"))
            .await
            .unwrap();
        assert_eq!(updated.content, "edited");

        fx.service.delete_comment(bob.id, comment.id).await.unwrap();
        let page = fx
            .service
            .list_comments(Some(post.id), PageRequest::new(1))
            .await
            .unwrap();
        assert_eq!(page.total_count, 0);
    }
}
