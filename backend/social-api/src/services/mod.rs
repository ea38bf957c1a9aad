pub mod accounts;
pub mod comments;
pub mod feed;
pub mod follow;
pub mod likes;
pub mod notifications;
pub mod posts;

pub use accounts::{AccountService, AuthResponse};
pub use comments::CommentService;
pub use feed::FeedService;
pub use follow::FollowService;
pub use likes::LikeService;
pub use notifications::NotificationService;
pub use posts::{PostService, PostViewBuilder};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::User;
    use crate::repository::{NewUser, Repositories};

    /// Insert a user directly, skipping password hashing
    pub async fn seed_user(repos: &Repositories, username: &str) -> User {
        repos
            .users
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: "not-a-real-hash".to_string(),
                bio: String::new(),
            })
            .await
            .unwrap()
            .unwrap()
    }
}
