#![allow(dead_code)]

use social_api::domain::User;
use social_api::repository::{NewUser, Repositories};
use social_api::security::JwtKeys;
use social_api::AppServices;
use std::sync::Arc;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// In-memory service graph plus handles for seeding data directly
pub struct TestContext {
    pub repos: Repositories,
    pub keys: Arc<JwtKeys>,
    pub services: AppServices,
}

impl TestContext {
    pub fn new() -> Self {
        let repos = Repositories::in_memory();
        let keys = Arc::new(JwtKeys::new(TEST_SECRET, 3600).expect("jwt keys"));
        let services = AppServices::new(&repos, keys.clone());
        Self {
            repos,
            keys,
            services,
        }
    }

    /// Seed a user without going through argon2 and return a bearer token
    pub async fn user(&self, username: &str) -> (User, String) {
        let user = self
            .repos
            .users
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: "seeded".to_string(),
                bio: String::new(),
            })
            .await
            .expect("create user")
            .expect("username free");
        let token = self.keys.issue_token(&user).expect("issue token");
        (user, format!("Bearer {}", token))
    }
}

/// Build the full app (auth middleware + `/api/v1` routes) for a context
#[macro_export]
macro_rules! test_app {
    ($ctx:expr) => {{
        let services = $ctx.services.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(social_api::middleware::JwtAuthMiddleware::new(
                    $ctx.keys.clone(),
                    $ctx.repos.users.clone(),
                ))
                .configure(|cfg| services.configure(cfg)),
        )
        .await
    }};
}
