/// Post service - creation, retrieval, listing and author-only mutation
use crate::domain::requests::{CreatePostRequest, UpdatePostRequest};
use crate::domain::{Page, PageRequest, Post, PostDetail, PostFilter, PostView, UserSummary};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::middleware::check_post_ownership;
use crate::repository::{CommentRepository, LikeRepository, PostRepository, UserRepository};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

/// Comments embedded in a single-post response
const DETAIL_COMMENT_LIMIT: i64 = 100;

/// Enriches posts with author summary and engagement counters.
/// Shared by post listings and the feed.
#[derive(Clone)]
pub struct PostViewBuilder {
    users: Arc<dyn UserRepository>,
    comments: Arc<dyn CommentRepository>,
    likes: Arc<dyn LikeRepository>,
}

impl PostViewBuilder {
    pub fn new(
        users: Arc<dyn UserRepository>,
        comments: Arc<dyn CommentRepository>,
        likes: Arc<dyn LikeRepository>,
    ) -> Self {
        Self {
            users,
            comments,
            likes,
        }
    }

    /// Batched lookups; output order matches `posts`
    pub async fn build(&self, posts: Vec<Post>, viewer: Option<Uuid>) -> Result<Vec<PostView>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let author_ids: Vec<Uuid> = posts
            .iter()
            .map(|p| p.author_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let authors: HashMap<Uuid, UserSummary> = self
            .users
            .get_users_by_ids(&author_ids)
            .await?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();
        let like_counts = self.likes.count_for_posts(&post_ids).await?;
        let comment_counts = self.comments.count_for_posts(&post_ids).await?;
        let liked = match viewer {
            Some(viewer) => self.likes.liked_post_ids(viewer, &post_ids).await?,
            None => HashSet::new(),
        };

        Ok(posts
            .into_iter()
            .map(|post| PostView {
                author: authors.get(&post.author_id).cloned(),
                like_count: like_counts.get(&post.id).copied().unwrap_or(0),
                comments_count: comment_counts.get(&post.id).copied().unwrap_or(0),
                is_liked: liked.contains(&post.id),
                post,
            })
            .collect())
    }

    pub async fn build_one(&self, post: Post, viewer: Option<Uuid>) -> Result<PostView> {
        self.build(vec![post], viewer)
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("post view missing".to_string()))
    }
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    views: PostViewBuilder,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        views: PostViewBuilder,
    ) -> Self {
        Self {
            posts,
            comments,
            views,
        }
    }

    pub(crate) async fn require_post(&self, post_id: Uuid) -> Result<Post> {
        self.posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("post".to_string()))
    }

    pub async fn create_post(&self, author_id: Uuid, req: CreatePostRequest) -> Result<PostView> {
        req.validate()?;

        let post = self
            .posts
            .create_post(author_id, req.title.trim(), &req.content)
            .await?;

        metrics::record_engagement("post");
        info!(post_id = %post.id, author_id = %author_id, "post created");
        self.views.build_one(post, Some(author_id)).await
    }

    /// Post with counters and its comments, oldest comment first
    pub async fn get_post(&self, viewer: Option<Uuid>, post_id: Uuid) -> Result<PostDetail> {
        let post = self.require_post(post_id).await?;
        let (comments, _) = self
            .comments
            .list_comments(Some(post_id), DETAIL_COMMENT_LIMIT, 0)
            .await?;
        let view = self.views.build_one(post, viewer).await?;
        Ok(PostDetail { view, comments })
    }

    pub async fn list_posts(
        &self,
        viewer: Option<Uuid>,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostView>> {
        let (posts, total) = self
            .posts
            .list_posts(filter, page.limit(), page.offset())
            .await?;
        debug!(page = page.page, total, "listed posts");

        let items = self.views.build(posts, viewer).await?;
        Ok(Page::new(items, page, total))
    }

    /// Partial update: absent fields keep their value. PUT and PATCH share it.
    pub async fn update_post(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
        req: UpdatePostRequest,
    ) -> Result<PostView> {
        req.validate()?;

        let post = self.require_post(post_id).await?;
        check_post_ownership(actor_id, &post)?;

        let updated = self
            .posts
            .update_post(
                post_id,
                req.title.as_deref().map(str::trim),
                req.content.as_deref(),
            )
            .await?
            .ok_or_else(|| AppError::NotFound("post".to_string()))?;

        info!(post_id = %post_id, "post updated");
        self.views.build_one(updated, Some(actor_id)).await
    }

    pub async fn delete_post(&self, actor_id: Uuid, post_id: Uuid) -> Result<()> {
        let post = self.require_post(post_id).await?;
        check_post_ownership(actor_id, &post)?;

        if !self.posts.delete_post(post_id).await? {
            return Err(AppError::NotFound("post".to_string()));
        }

        info!(post_id = %post_id, author_id = %actor_id, "post deleted");
        Ok(())
    }
}
