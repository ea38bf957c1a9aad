/// Service graph shared by the binary and the integration tests
use crate::handlers;
use crate::repository::Repositories;
use crate::security::JwtKeys;
use crate::services::{
    AccountService, CommentService, FeedService, FollowService, LikeService, NotificationService,
    PostService, PostViewBuilder,
};
use actix_web::web;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppServices {
    pub accounts: Arc<AccountService>,
    pub follows: Arc<FollowService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub likes: Arc<LikeService>,
    pub notifications: Arc<NotificationService>,
    pub feed: Arc<FeedService>,
    pub keys: Arc<JwtKeys>,
}

impl AppServices {
    pub fn new(repos: &Repositories, keys: Arc<JwtKeys>) -> Self {
        let notifications = Arc::new(NotificationService::new(repos.notifications.clone()));
        let views = PostViewBuilder::new(
            repos.users.clone(),
            repos.comments.clone(),
            repos.likes.clone(),
        );

        let follows = Arc::new(FollowService::new(
            repos.users.clone(),
            repos.follows.clone(),
        ));

        Self {
            accounts: Arc::new(AccountService::new(
                repos.users.clone(),
                follows.clone(),
                keys.clone(),
            )),
            follows,
            posts: Arc::new(PostService::new(
                repos.posts.clone(),
                repos.comments.clone(),
                views.clone(),
            )),
            comments: Arc::new(CommentService::new(
                repos.posts.clone(),
                repos.comments.clone(),
                notifications.clone(),
            )),
            likes: Arc::new(LikeService::new(
                repos.posts.clone(),
                repos.likes.clone(),
                notifications.clone(),
            )),
            feed: Arc::new(FeedService::new(
                repos.follows.clone(),
                repos.posts.clone(),
                views,
            )),
            notifications,
            keys,
        }
    }

    /// Register shared state, extractor configs and `/api/v1` routes
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::from(self.accounts.clone()))
            .app_data(web::Data::from(self.follows.clone()))
            .app_data(web::Data::from(self.posts.clone()))
            .app_data(web::Data::from(self.comments.clone()))
            .app_data(web::Data::from(self.likes.clone()))
            .app_data(web::Data::from(self.notifications.clone()))
            .app_data(web::Data::from(self.feed.clone()))
            .app_data(handlers::json_config())
            .app_data(handlers::query_config())
            .configure(handlers::register_routes);
    }
}
