//! Storage layer: one trait per aggregate, backed by PostgreSQL or memory.

pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::InMemoryStore;
pub use traits::{
    CommentRepository, FollowRepository, LikeRepository, NewUser, NotificationRepository,
    PostRepository, UserChanges, UserRepository,
};

use sqlx::PgPool;
use std::sync::Arc;

/// Trait objects for every repository the services depend on
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(postgres::PgUserRepository::new(pool.clone())),
            follows: Arc::new(postgres::PgFollowRepository::new(pool.clone())),
            posts: Arc::new(postgres::PgPostRepository::new(pool.clone())),
            comments: Arc::new(postgres::PgCommentRepository::new(pool.clone())),
            likes: Arc::new(postgres::PgLikeRepository::new(pool.clone())),
            notifications: Arc::new(postgres::PgNotificationRepository::new(pool)),
        }
    }

    /// All repositories share one store so cascades stay consistent
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            follows: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            likes: store.clone(),
            notifications: store,
        }
    }
}
