/// Feed assembler - paginated, newest-first posts from the accounts a user follows
use crate::domain::{Page, PageRequest, PostView};
use crate::error::Result;
use crate::repository::{FollowRepository, PostRepository};
use crate::services::PostViewBuilder;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub struct FeedService {
    follows: Arc<dyn FollowRepository>,
    posts: Arc<dyn PostRepository>,
    views: PostViewBuilder,
}

impl FeedService {
    pub fn new(
        follows: Arc<dyn FollowRepository>,
        posts: Arc<dyn PostRepository>,
        views: PostViewBuilder,
    ) -> Self {
        Self {
            follows,
            posts,
            views,
        }
    }

    /// Only posts authored by followees, never the user's own or anyone
    /// else's. Following nobody yields an empty feed.
    pub async fn get_feed(&self, user_id: Uuid, page: PageRequest) -> Result<Page<PostView>> {
        let followees = self.follows.get_following(user_id).await?;
        if followees.is_empty() {
            debug!(user_id = %user_id, "feed empty: following nobody");
            return Ok(Page::new(Vec::new(), page, 0));
        }

        let (posts, total) = self
            .posts
            .list_posts_by_authors(&followees, page.limit(), page.offset())
            .await?;

        debug!(
            user_id = %user_id,
            followees = followees.len(),
            page = page.page,
            total,
            returned = posts.len(),
            "feed assembled"
        );

        let items = self.views.build(posts, Some(user_id)).await?;
        Ok(Page::new(items, page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Repositories;
    use crate::services::test_support::seed_user;
    use std::collections::HashSet;

    fn service(repos: &Repositories) -> FeedService {
        FeedService::new(
            repos.follows.clone(),
            repos.posts.clone(),
            PostViewBuilder::new(repos.users.clone(), repos.comments.clone(), repos.likes.clone()),
        )
    }

    #[tokio::test]
    async fn test_two_followees_newest_first() {
        let repos = Repositories::in_memory();
        let u = seed_user(&repos, "reader").await;
        let a = seed_user(&repos, "author_a").await;
        let b = seed_user(&repos, "author_b").await;
        repos.follows.create_follow(u.id, a.id).await.unwrap();
        repos.follows.create_follow(u.id, b.id).await.unwrap();

        let first = repos.posts.create_post(a.id, "from a", "x").await.unwrap();
        let second = repos.posts.create_post(b.id, "from b", "y").await.unwrap();

        let feed = service(&repos).get_feed(u.id, PageRequest::new(1)).await.unwrap();
        assert_eq!(feed.total_count, 2);
        assert!(!feed.has_next);
        assert_eq!(feed.items[0].post.id, second.id);
        assert_eq!(feed.items[1].post.id, first.id);
    }

    #[tokio::test]
    async fn test_only_followees_posts() {
        let repos = Repositories::in_memory();
        let u = seed_user(&repos, "reader").await;
        let a = seed_user(&repos, "followed").await;
        let stranger = seed_user(&repos, "stranger").await;
        repos.follows.create_follow(u.id, a.id).await.unwrap();

        repos.posts.create_post(a.id, "yes", "x").await.unwrap();
        repos.posts.create_post(stranger.id, "no", "x").await.unwrap();
        repos.posts.create_post(u.id, "own", "x").await.unwrap();

        let feed = service(&repos).get_feed(u.id, PageRequest::new(1)).await.unwrap();
        assert_eq!(feed.total_count, 1);
        assert!(feed.items.iter().all(|v| v.post.author_id == a.id));
    }

    #[tokio::test]
    async fn test_pagination_stable_total_and_disjoint_pages() {
        let repos = Repositories::in_memory();
        let u = seed_user(&repos, "reader").await;
        let a = seed_user(&repos, "prolific").await;
        repos.follows.create_follow(u.id, a.id).await.unwrap();
        for i in 0..23 {
            repos
                .posts
                .create_post(a.id, &format!("post {}", i), "x")
                .await
                .unwrap();
        }

        let service = service(&repos);
        let mut seen = HashSet::new();
        for (page_no, expected_len, expected_next) in [(1, 10, true), (2, 10, true), (3, 3, false)] {
            let page = service.get_feed(u.id, PageRequest::new(page_no)).await.unwrap();
            assert_eq!(page.total_count, 23);
            assert_eq!(page.items.len(), expected_len);
            assert_eq!(page.has_next, expected_next);
            for item in page.items {
                assert!(seen.insert(item.post.id), "post repeated across pages");
            }
        }

        let past_end = service.get_feed(u.id, PageRequest::new(4)).await.unwrap();
        assert!(past_end.items.is_empty());
        assert!(!past_end.has_next);
    }

    #[tokio::test]
    async fn test_following_nobody_is_empty() {
        let repos = Repositories::in_memory();
        let u = seed_user(&repos, "loner").await;
        let other = seed_user(&repos, "other").await;
        repos.posts.create_post(other.id, "hi", "x").await.unwrap();

        let feed = service(&repos).get_feed(u.id, PageRequest::new(1)).await.unwrap();
        assert!(feed.items.is_empty());
        assert_eq!(feed.total_count, 0);
        assert!(!feed.has_next);
    }
}
