use crate::domain::{
    Comment, Like, NewNotification, Notification, NotificationStats, Post, PostFilter, User,
};
use crate::error::Result;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Insert payload for a new user (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub bio: String,
}

/// Resolved profile changes; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns `None` if the username is already taken
    async fn create_user(&self, new_user: NewUser) -> Result<Option<User>>;

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Missing ids are skipped; order is unspecified
    async fn get_users_by_ids(&self, user_ids: &[Uuid]) -> Result<Vec<User>>;

    async fn update_user(&self, user_id: Uuid, changes: UserChanges) -> Result<Option<User>>;

    /// Case-insensitive username substring match, excluding one user.
    /// `None` matches everyone.
    async fn search_users(
        &self,
        username: Option<&str>,
        exclude: Uuid,
        limit: i64,
    ) -> Result<Vec<User>>;
}

/// Directed follow edges keyed by (follower_id, followee_id)
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FollowRepository: Send + Sync {
    /// Returns true if a new edge was inserted
    async fn create_follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool>;

    /// Returns true if an edge was removed
    async fn delete_follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool>;

    async fn is_following(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool>;

    /// Users following `user_id`, most recent edge first
    async fn get_followers(&self, user_id: Uuid) -> Result<Vec<Uuid>>;

    /// Users `user_id` follows, most recent edge first
    async fn get_following(&self, user_id: Uuid) -> Result<Vec<Uuid>>;

    async fn count_followers(&self, user_id: Uuid) -> Result<i64>;

    async fn count_following(&self, user_id: Uuid) -> Result<i64>;
}

#[async_trait::async_trait]
pub trait PostRepository: Send + Sync {
    async fn create_post(&self, author_id: Uuid, title: &str, content: &str) -> Result<Post>;

    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>>;

    async fn update_post(
        &self,
        post_id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Option<Post>>;

    /// Removes the post together with its comments and likes
    async fn delete_post(&self, post_id: Uuid) -> Result<bool>;

    /// Returns (page of posts, total matching count)
    async fn list_posts(
        &self,
        filter: &PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Post>, i64)>;

    /// Posts authored by any of `author_ids`, newest first.
    /// Returns (page of posts, total matching count).
    async fn list_posts_by_authors(
        &self,
        author_ids: &[Uuid],
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Post>, i64)>;
}

#[async_trait::async_trait]
pub trait CommentRepository: Send + Sync {
    /// Inserts the comment and, when given, the notification it triggers
    /// in one transaction. A failed notification leaves no comment behind.
    async fn create_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: &str,
        notification: Option<NewNotification>,
    ) -> Result<(Comment, Option<Notification>)>;

    async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>>;

    async fn update_comment(&self, comment_id: Uuid, content: &str) -> Result<Option<Comment>>;

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool>;

    /// Oldest first. Returns (page of comments, total matching count).
    async fn list_comments(
        &self,
        post_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Comment>, i64)>;

    /// Comment count per post; posts without comments are absent
    async fn count_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>>;
}

#[async_trait::async_trait]
pub trait LikeRepository: Send + Sync {
    /// Inserts the like and, when given, the notification it triggers in
    /// one transaction. Returns `None` and writes nothing if the (user, post)
    /// pair already exists.
    async fn create_like(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        notification: Option<NewNotification>,
    ) -> Result<Option<(Like, Option<Notification>)>>;

    /// Returns true if a like was removed
    async fn delete_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool>;

    async fn get_like_count(&self, post_id: Uuid) -> Result<i64>;

    /// Like count per post; posts without likes are absent
    async fn count_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>>;

    /// Subset of `post_ids` liked by `user_id`
    async fn liked_post_ids(&self, user_id: Uuid, post_ids: &[Uuid]) -> Result<HashSet<Uuid>>;
}

/// Append-only notification log keyed by recipient
#[async_trait::async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Standalone append; likes and comments write theirs through
    /// `create_like` / `create_comment`
    async fn create_notification(&self, new: NewNotification) -> Result<Notification>;

    async fn get_notification(&self, notification_id: Uuid) -> Result<Option<Notification>>;

    /// Newest first. Returns (page of notifications, total count).
    async fn list_for_recipient(
        &self,
        recipient_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Notification>, i64)>;

    async fn set_read(&self, notification_id: Uuid, read: bool) -> Result<Option<Notification>>;

    /// Returns the number of notifications flipped from unread to read
    async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u64>;

    async fn stats(&self, recipient_id: Uuid) -> Result<NotificationStats>;
}
