/// Follow graph - directed (follower -> followee) edges between users
use crate::domain::{User, UserSummary};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::repository::{FollowRepository, UserRepository};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct FollowService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl FollowService {
    pub fn new(users: Arc<dyn UserRepository>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { users, follows }
    }

    async fn require_user(&self, user_id: Uuid) -> Result<User> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string()))
    }

    /// Returns the followee so callers can report who was followed
    pub async fn follow(&self, actor_id: Uuid, target_id: Uuid) -> Result<User> {
        let target = self.require_user(target_id).await?;

        if actor_id == target_id {
            return Err(AppError::Conflict("You cannot follow yourself".to_string()));
        }

        // The unique edge key decides races between concurrent follows
        if !self.follows.create_follow(actor_id, target_id).await? {
            return Err(AppError::Conflict(
                "You are already following this user".to_string(),
            ));
        }

        metrics::record_follow_event("follow");
        info!(follower_id = %actor_id, followee_id = %target_id, "follow created");
        Ok(target)
    }

    pub async fn unfollow(&self, actor_id: Uuid, target_id: Uuid) -> Result<User> {
        let target = self.require_user(target_id).await?;

        if !self.follows.delete_follow(actor_id, target_id).await? {
            return Err(AppError::Conflict(
                "You are not following this user".to_string(),
            ));
        }

        metrics::record_follow_event("unfollow");
        info!(follower_id = %actor_id, followee_id = %target_id, "follow removed");
        Ok(target)
    }

    pub async fn is_following(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool> {
        self.follows.is_following(follower_id, followee_id).await
    }

    pub async fn list_followers(&self, user_id: Uuid) -> Result<Vec<UserSummary>> {
        let ids = self.follows.get_followers(user_id).await?;
        self.summaries_in_order(&ids).await
    }

    pub async fn list_following(&self, user_id: Uuid) -> Result<Vec<UserSummary>> {
        let ids = self.follows.get_following(user_id).await?;
        self.summaries_in_order(&ids).await
    }

    /// (following_count, followers_count)
    pub async fn counts(&self, user_id: Uuid) -> Result<(i64, i64)> {
        let following = self.follows.count_following(user_id).await?;
        let followers = self.follows.count_followers(user_id).await?;
        Ok((following, followers))
    }

    async fn summaries_in_order(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>> {
        let users: HashMap<Uuid, User> = self
            .users
            .get_users_by_ids(ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(ids
            .iter()
            .filter_map(|id| users.get(id).map(UserSummary::from))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::traits::MockFollowRepository;
    use crate::repository::Repositories;
    use crate::services::test_support::seed_user;

    fn service(repos: &Repositories) -> FollowService {
        FollowService::new(repos.users.clone(), repos.follows.clone())
    }

    #[tokio::test]
    async fn test_follow_then_unfollow() {
        let repos = Repositories::in_memory();
        let alice = seed_user(&repos, "alice").await;
        let bob = seed_user(&repos, "bob").await;
        let service = service(&repos);

        let followed = service.follow(alice.id, bob.id).await.unwrap();
        assert_eq!(followed.username, "bob");
        assert!(service.is_following(alice.id, bob.id).await.unwrap());
        assert!(!service.is_following(bob.id, alice.id).await.unwrap());

        service.unfollow(alice.id, bob.id).await.unwrap();
        assert!(!service.is_following(alice.id, bob.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_self_follow_rejected() {
        let repos = Repositories::in_memory();
        let alice = seed_user(&repos, "alice").await;

        let err = service(&repos).follow(alice.id, alice.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == "You cannot follow yourself"));
    }

    #[tokio::test]
    async fn test_duplicate_follow_and_missing_edge() {
        let repos = Repositories::in_memory();
        let alice = seed_user(&repos, "alice").await;
        let bob = seed_user(&repos, "bob").await;
        let service = service(&repos);

        service.follow(alice.id, bob.id).await.unwrap();
        assert!(matches!(
            service.follow(alice.id, bob.id).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(service.counts(alice.id).await.unwrap(), (1, 0));

        service.unfollow(alice.id, bob.id).await.unwrap();
        assert!(matches!(
            service.unfollow(alice.id, bob.id).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_target_is_not_found() {
        let repos = Repositories::in_memory();
        let alice = seed_user(&repos, "alice").await;

        assert!(matches!(
            service(&repos).follow(alice.id, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_lists_most_recent_first() {
        let repos = Repositories::in_memory();
        let alice = seed_user(&repos, "alice").await;
        let bob = seed_user(&repos, "bob").await;
        let carol = seed_user(&repos, "carol").await;
        let service = service(&repos);

        service.follow(alice.id, bob.id).await.unwrap();
        service.follow(alice.id, carol.id).await.unwrap();
        service.follow(carol.id, bob.id).await.unwrap();

        let following: Vec<_> = service
            .list_following(alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(following, vec!["carol", "bob"]);

        let followers: Vec<_> = service
            .list_followers(bob.id)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(followers, vec!["carol", "alice"]);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let repos = Repositories::in_memory();
        let alice = seed_user(&repos, "alice").await;
        let bob = seed_user(&repos, "bob").await;

        let mut follows = MockFollowRepository::new();
        follows
            .expect_create_follow()
            .returning(|_, _| Err(AppError::Database("connection reset".to_string())));

        let service = FollowService::new(repos.users.clone(), Arc::new(follows));
        assert!(matches!(
            service.follow(alice.id, bob.id).await,
            Err(AppError::Database(_))
        ));
    }
}
