//! In-memory storage used when no database is configured and in tests.
//!
//! All collections live behind a single `RwLock`, so every check-then-insert
//! runs under one write guard and duplicate follows/likes cannot race. A like
//! or comment and its notification are built first and pushed under the same
//! guard, which stands in for the Postgres transaction.

use super::traits::{
    CommentRepository, FollowRepository, LikeRepository, NewUser, NotificationRepository,
    PostRepository, UserChanges, UserRepository,
};
use crate::domain::{
    Comment, FollowEdge, Like, NewNotification, Notification, NotificationStats, Post,
    PostFilter, PostOrdering, User,
};
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    // Vectors keep insertion order, which breaks timestamp ties.
    users: Vec<User>,
    follows: Vec<FollowEdge>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
    notifications: Vec<Notification>,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryState {
    /// Same constraint as the notifications foreign keys: recipient and
    /// actor must be known users.
    fn build_notification(&self, new: NewNotification) -> Result<Notification> {
        for (role, user_id) in [("recipient", new.recipient_id), ("actor", new.actor_id)] {
            if !self.users.iter().any(|u| u.id == user_id) {
                return Err(AppError::Database(format!(
                    "notification {} {} does not exist",
                    role, user_id
                )));
            }
        }

        Ok(Notification {
            id: Uuid::new_v4(),
            recipient_id: new.recipient_id,
            actor_id: new.actor_id,
            verb: new.verb,
            target_id: new.target_id,
            target_type: "post".to_string(),
            read: false,
            created_at: Utc::now(),
        })
    }

    fn build_optional(&self, new: Option<NewNotification>) -> Result<Option<Notification>> {
        new.map(|new| self.build_notification(new)).transpose()
    }
}

/// Newest first; equal timestamps keep the most recently inserted first.
fn newest_first<'a, T>(items: impl DoubleEndedIterator<Item = &'a T>, ts: fn(&T) -> DateTime<Utc>) -> Vec<&'a T>
where
    T: 'a,
{
    let mut sorted: Vec<&T> = items.rev().collect();
    sorted.sort_by(|a, b| ts(b).cmp(&ts(a)));
    sorted
}

fn oldest_first<'a, T>(items: impl Iterator<Item = &'a T>, ts: fn(&T) -> DateTime<Utc>) -> Vec<&'a T>
where
    T: 'a,
{
    let mut sorted: Vec<&T> = items.collect();
    sorted.sort_by_key(|item| ts(item));
    sorted
}

fn paginate<T: Clone>(items: Vec<&T>, limit: i64, offset: i64) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let page = items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .cloned()
        .collect();
    (page, total)
}

fn count_by_post<'a>(post_ids: &[Uuid], owners: impl Iterator<Item = &'a Uuid>) -> HashMap<Uuid, i64> {
    let wanted: HashSet<&Uuid> = post_ids.iter().collect();
    let mut counts = HashMap::new();
    for post_id in owners.filter(|id| wanted.contains(id)) {
        *counts.entry(*post_id).or_insert(0) += 1;
    }
    counts
}

#[async_trait::async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<Option<User>> {
        let mut state = self.state.write().await;
        if state
            .users
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(&new_user.username))
        {
            return Ok(None);
        }

        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            bio: new_user.bio,
            profile_picture: None,
            created_at: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(Some(user))
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn get_users_by_ids(&self, user_ids: &[Uuid]) -> Result<Vec<User>> {
        let wanted: HashSet<&Uuid> = user_ids.iter().collect();
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .filter(|u| wanted.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn update_user(&self, user_id: Uuid, changes: UserChanges) -> Result<Option<User>> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(None);
        };

        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(bio) = changes.bio {
            user.bio = bio;
        }
        if let Some(picture) = changes.profile_picture {
            user.profile_picture = Some(picture);
        }
        Ok(Some(user.clone()))
    }

    async fn search_users(
        &self,
        username: Option<&str>,
        exclude: Uuid,
        limit: i64,
    ) -> Result<Vec<User>> {
        let needle = username.map(str::to_lowercase);
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .filter(|u| u.id != exclude)
            .filter(|u| match &needle {
                Some(needle) => u.username.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl FollowRepository for InMemoryStore {
    async fn create_follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if state
            .follows
            .iter()
            .any(|e| e.follower_id == follower_id && e.followee_id == followee_id)
        {
            return Ok(false);
        }
        state.follows.push(FollowEdge::new(follower_id, followee_id));
        Ok(true)
    }

    async fn delete_follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.follows.len();
        state
            .follows
            .retain(|e| !(e.follower_id == follower_id && e.followee_id == followee_id));
        Ok(state.follows.len() < before)
    }

    async fn is_following(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .iter()
            .any(|e| e.follower_id == follower_id && e.followee_id == followee_id))
    }

    async fn get_followers(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let state = self.state.read().await;
        let edges = newest_first(
            state.follows.iter().filter(|e| e.followee_id == user_id),
            |e| e.created_at,
        );
        Ok(edges.into_iter().map(|e| e.follower_id).collect())
    }

    async fn get_following(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let state = self.state.read().await;
        let edges = newest_first(
            state.follows.iter().filter(|e| e.follower_id == user_id),
            |e| e.created_at,
        );
        Ok(edges.into_iter().map(|e| e.followee_id).collect())
    }

    async fn count_followers(&self, user_id: Uuid) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state.follows.iter().filter(|e| e.followee_id == user_id).count() as i64)
    }

    async fn count_following(&self, user_id: Uuid) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state.follows.iter().filter(|e| e.follower_id == user_id).count() as i64)
    }
}

#[async_trait::async_trait]
impl PostRepository for InMemoryStore {
    async fn create_post(&self, author_id: Uuid, title: &str, content: &str) -> Result<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            author_id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.posts.push(post.clone());
        Ok(post)
    }

    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let state = self.state.read().await;
        Ok(state.posts.iter().find(|p| p.id == post_id).cloned())
    }

    async fn update_post(
        &self,
        post_id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Option<Post>> {
        let mut state = self.state.write().await;
        let Some(post) = state.posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(None);
        };

        if let Some(title) = title {
            post.title = title.to_string();
        }
        if let Some(content) = content {
            post.content = content.to_string();
        }
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.posts.len();
        state.posts.retain(|p| p.id != post_id);
        if state.posts.len() == before {
            return Ok(false);
        }
        state.comments.retain(|c| c.post_id != post_id);
        state.likes.retain(|l| l.post_id != post_id);
        Ok(true)
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Post>, i64)> {
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let state = self.state.read().await;

        let matching = state
            .posts
            .iter()
            .filter(|p| filter.author_id.map_or(true, |author| p.author_id == author))
            .filter(|p| match &needle {
                Some(needle) => {
                    p.title.to_lowercase().contains(needle.as_str())
                        || p.content.to_lowercase().contains(needle.as_str())
                }
                None => true,
            });

        let sorted = match filter.ordering {
            PostOrdering::CreatedDesc => newest_first(matching, |p| p.created_at),
            PostOrdering::CreatedAsc => oldest_first(matching, |p| p.created_at),
            PostOrdering::UpdatedDesc => newest_first(matching, |p| p.updated_at),
            PostOrdering::UpdatedAsc => oldest_first(matching, |p| p.updated_at),
        };
        Ok(paginate(sorted, limit, offset))
    }

    async fn list_posts_by_authors(
        &self,
        author_ids: &[Uuid],
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Post>, i64)> {
        let authors: HashSet<&Uuid> = author_ids.iter().collect();
        let state = self.state.read().await;
        let sorted = newest_first(
            state.posts.iter().filter(|p| authors.contains(&p.author_id)),
            |p| p.created_at,
        );
        Ok(paginate(sorted, limit, offset))
    }
}

#[async_trait::async_trait]
impl CommentRepository for InMemoryStore {
    async fn create_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: &str,
        notification: Option<NewNotification>,
    ) -> Result<(Comment, Option<Notification>)> {
        let mut state = self.state.write().await;
        // Build everything before mutating so a failure writes nothing
        let notification = state.build_optional(notification)?;

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.comments.push(comment.clone());
        if let Some(notification) = &notification {
            state.notifications.push(notification.clone());
        }
        Ok((comment, notification))
    }

    async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        let state = self.state.read().await;
        Ok(state.comments.iter().find(|c| c.id == comment_id).cloned())
    }

    async fn update_comment(&self, comment_id: Uuid, content: &str) -> Result<Option<Comment>> {
        let mut state = self.state.write().await;
        let Some(comment) = state.comments.iter_mut().find(|c| c.id == comment_id) else {
            return Ok(None);
        };
        comment.content = content.to_string();
        comment.updated_at = Utc::now();
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.comments.len();
        state.comments.retain(|c| c.id != comment_id);
        Ok(state.comments.len() < before)
    }

    async fn list_comments(
        &self,
        post_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Comment>, i64)> {
        let state = self.state.read().await;
        let sorted = oldest_first(
            state
                .comments
                .iter()
                .filter(|c| post_id.map_or(true, |post| c.post_id == post)),
            |c| c.created_at,
        );
        Ok(paginate(sorted, limit, offset))
    }

    async fn count_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>> {
        let state = self.state.read().await;
        Ok(count_by_post(
            post_ids,
            state.comments.iter().map(|c| &c.post_id),
        ))
    }
}

#[async_trait::async_trait]
impl LikeRepository for InMemoryStore {
    async fn create_like(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        notification: Option<NewNotification>,
    ) -> Result<Option<(Like, Option<Notification>)>> {
        let mut state = self.state.write().await;
        if state
            .likes
            .iter()
            .any(|l| l.user_id == user_id && l.post_id == post_id)
        {
            return Ok(None);
        }
        let notification = state.build_optional(notification)?;

        let like = Like {
            id: Uuid::new_v4(),
            user_id,
            post_id,
            created_at: Utc::now(),
        };
        state.likes.push(like.clone());
        if let Some(notification) = &notification {
            state.notifications.push(notification.clone());
        }
        Ok(Some((like, notification)))
    }

    async fn delete_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.likes.len();
        state
            .likes
            .retain(|l| !(l.user_id == user_id && l.post_id == post_id));
        Ok(state.likes.len() < before)
    }

    async fn get_like_count(&self, post_id: Uuid) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state.likes.iter().filter(|l| l.post_id == post_id).count() as i64)
    }

    async fn count_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>> {
        let state = self.state.read().await;
        Ok(count_by_post(post_ids, state.likes.iter().map(|l| &l.post_id)))
    }

    async fn liked_post_ids(&self, user_id: Uuid, post_ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        let wanted: HashSet<&Uuid> = post_ids.iter().collect();
        let state = self.state.read().await;
        Ok(state
            .likes
            .iter()
            .filter(|l| l.user_id == user_id && wanted.contains(&l.post_id))
            .map(|l| l.post_id)
            .collect())
    }
}

#[async_trait::async_trait]
impl NotificationRepository for InMemoryStore {
    async fn create_notification(&self, new: NewNotification) -> Result<Notification> {
        let mut state = self.state.write().await;
        let notification = state.build_notification(new)?;
        state.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn get_notification(&self, notification_id: Uuid) -> Result<Option<Notification>> {
        let state = self.state.read().await;
        Ok(state
            .notifications
            .iter()
            .find(|n| n.id == notification_id)
            .cloned())
    }

    async fn list_for_recipient(
        &self,
        recipient_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Notification>, i64)> {
        let state = self.state.read().await;
        let sorted = newest_first(
            state
                .notifications
                .iter()
                .filter(|n| n.recipient_id == recipient_id),
            |n| n.created_at,
        );
        Ok(paginate(sorted, limit, offset))
    }

    async fn set_read(&self, notification_id: Uuid, read: bool) -> Result<Option<Notification>> {
        let mut state = self.state.write().await;
        let Some(notification) = state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
        else {
            return Ok(None);
        };
        notification.read = read;
        Ok(Some(notification.clone()))
    }

    async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u64> {
        let mut state = self.state.write().await;
        let mut updated = 0;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| n.recipient_id == recipient_id && !n.read)
        {
            notification.read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn stats(&self, recipient_id: Uuid) -> Result<NotificationStats> {
        let state = self.state.read().await;
        let mine = state
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id);
        let (total, unread) = mine.fold((0, 0), |(total, unread), n| {
            (total + 1, if n.read { unread } else { unread + 1 })
        });
        Ok(NotificationStats {
            total_notifications: total,
            unread_notifications: unread,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: "hash".to_string(),
            bio: String::new(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = InMemoryStore::new();
        assert!(store.create_user(new_user("alice")).await.unwrap().is_some());
        assert!(store.create_user(new_user("ALICE")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_follow_edge_unique() {
        let store = InMemoryStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(store.create_follow(a, b).await.unwrap());
        assert!(!store.create_follow(a, b).await.unwrap());
        assert!(store.create_follow(b, a).await.unwrap());
        assert_eq!(store.count_following(a).await.unwrap(), 1);
        assert_eq!(store.count_followers(a).await.unwrap(), 1);

        assert!(store.delete_follow(a, b).await.unwrap());
        assert!(!store.delete_follow(a, b).await.unwrap());
        assert!(!store.is_following(a, b).await.unwrap());
        assert!(store.is_following(b, a).await.unwrap());
    }

    #[tokio::test]
    async fn test_follow_lists_most_recent_edge_first() {
        let store = InMemoryStore::new();
        let me = Uuid::new_v4();
        let others: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        for other in &others {
            store.create_follow(me, *other).await.unwrap();
            store.create_follow(*other, me).await.unwrap();
        }

        let expected: Vec<Uuid> = others.iter().rev().copied().collect();
        assert_eq!(store.get_following(me).await.unwrap(), expected);
        assert_eq!(store.get_followers(me).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_like_unique_per_pair() {
        let store = InMemoryStore::new();
        let (user, post) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(store.create_like(user, post, None).await.unwrap().is_some());
        assert!(store.create_like(user, post, None).await.unwrap().is_none());
        assert_eq!(store.get_like_count(post).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_posts_by_authors_newest_first() {
        let store = InMemoryStore::new();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let first = store.create_post(a, "one", "1").await.unwrap();
        let second = store.create_post(b, "two", "2").await.unwrap();
        store.create_post(c, "three", "3").await.unwrap();

        let (posts, total) = store.list_posts_by_authors(&[a, b], 10, 0).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(posts[0].id, second.id);
        assert_eq!(posts[1].id, first.id);
    }

    #[tokio::test]
    async fn test_delete_post_cascades() {
        let store = InMemoryStore::new();
        let author = Uuid::new_v4();
        let post = store.create_post(author, "t", "c").await.unwrap();
        store.create_comment(post.id, author, "hi", None).await.unwrap();
        store.create_like(author, post.id, None).await.unwrap();

        assert!(store.delete_post(post.id).await.unwrap());
        let (comments, total) = store.list_comments(Some(post.id), 10, 0).await.unwrap();
        assert!(comments.is_empty());
        assert_eq!(total, 0);
        assert_eq!(store.get_like_count(post.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_all_read_only_touches_recipient() {
        let store = InMemoryStore::new();
        let mut ids = Vec::new();
        for name in ["alice", "bob", "carol"] {
            ids.push(store.create_user(new_user(name)).await.unwrap().unwrap().id);
        }
        let (alice, bob, actor) = (ids[0], ids[1], ids[2]);
        for recipient in [alice, alice, bob] {
            store
                .create_notification(NewNotification {
                    recipient_id: recipient,
                    actor_id: actor,
                    verb: crate::domain::NotificationVerb::Like,
                    target_id: Uuid::new_v4(),
                })
                .await
                .unwrap();
        }

        assert_eq!(store.mark_all_read(alice).await.unwrap(), 2);
        assert_eq!(store.mark_all_read(alice).await.unwrap(), 0);

        let bob_stats = store.stats(bob).await.unwrap();
        assert_eq!(bob_stats.total_notifications, 1);
        assert_eq!(bob_stats.unread_notifications, 1);
    }

    fn like_notification(recipient_id: Uuid, actor_id: Uuid, post_id: Uuid) -> NewNotification {
        NewNotification {
            recipient_id,
            actor_id,
            verb: crate::domain::NotificationVerb::Like,
            target_id: post_id,
        }
    }

    #[tokio::test]
    async fn test_like_and_notification_written_together() {
        let store = InMemoryStore::new();
        let author = store.create_user(new_user("alice")).await.unwrap().unwrap();
        let fan = store.create_user(new_user("bob")).await.unwrap().unwrap();
        let post = store.create_post(author.id, "t", "c").await.unwrap();

        let (_, notification) = store
            .create_like(fan.id, post.id, Some(like_notification(author.id, fan.id, post.id)))
            .await
            .unwrap()
            .unwrap();
        assert!(notification.is_some());
        assert_eq!(store.stats(author.id).await.unwrap().total_notifications, 1);

        // duplicate like writes neither row
        assert!(store
            .create_like(fan.id, post.id, Some(like_notification(author.id, fan.id, post.id)))
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.stats(author.id).await.unwrap().total_notifications, 1);
    }

    #[tokio::test]
    async fn test_failed_notification_rolls_back_like_and_comment() {
        let store = InMemoryStore::new();
        let fan = store.create_user(new_user("bob")).await.unwrap().unwrap();
        let missing_author = Uuid::new_v4();
        let post = store.create_post(missing_author, "t", "c").await.unwrap();

        let result = store
            .create_like(fan.id, post.id, Some(like_notification(missing_author, fan.id, post.id)))
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));
        assert_eq!(store.get_like_count(post.id).await.unwrap(), 0);

        let result = store
            .create_comment(
                post.id,
                fan.id,
                "hello",
                Some(like_notification(missing_author, fan.id, post.id)),
            )
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));
        let (_, total) = store.list_comments(Some(post.id), 10, 0).await.unwrap();
        assert_eq!(total, 0);
    }
}
