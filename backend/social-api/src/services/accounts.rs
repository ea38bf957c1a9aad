/// User directory - registration, login, profiles and user search
use crate::domain::requests::{LoginRequest, ProfileUpdate, RegisterRequest};
use crate::domain::{User, UserProfile, UserSummary};
use crate::error::{AppError, Result};
use crate::repository::{NewUser, UserChanges, UserRepository};
use crate::security::{hash_password, verify_password, JwtKeys};
use crate::services::FollowService;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// Upper bound for `list_users` without a query
const LIST_USERS_LIMIT: i64 = 20;
/// Upper bound for username search results
const SEARCH_USERS_LIMIT: i64 = 100;

/// Returned by register and login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    follows: Arc<FollowService>,
    keys: Arc<JwtKeys>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        follows: Arc<FollowService>,
        keys: Arc<JwtKeys>,
    ) -> Self {
        Self {
            users,
            follows,
            keys,
        }
    }

    fn auth_response(&self, user: User) -> Result<AuthResponse> {
        let token = self.keys.issue_token(&user)?;
        Ok(AuthResponse {
            user,
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.keys.ttl_secs(),
        })
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse> {
        req.validate()?;

        if self.users.find_by_username(&req.username).await?.is_some() {
            return Err(AppError::field(
                "username",
                "A user with that username already exists.",
            ));
        }

        let password_hash = hash_password(&req.password)?;
        let user = self
            .users
            .create_user(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
                bio: req.bio.unwrap_or_default(),
            })
            .await?
            // lost a race with a concurrent registration
            .ok_or_else(|| AppError::field("username", "A user with that username already exists."))?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        self.auth_response(user)
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse> {
        req.validate()?;

        // A corrupt stored hash is a server error, not a bad password
        let user = match self.users.find_by_username(&req.username).await? {
            Some(user) if verify_password(&req.password, &user.password_hash)? => user,
            _ => {
                warn!(username = %req.username, "login failed");
                return Err(AppError::BadRequest("Invalid credentials".to_string()));
            }
        };

        info!(user_id = %user.id, "user logged in");
        self.auth_response(user)
    }

    pub async fn get_profile(&self, viewer_id: Uuid, user_id: Uuid) -> Result<UserProfile> {
        let user = self
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string()))?;
        self.profile_of(viewer_id, user).await
    }

    pub async fn update_profile(&self, actor_id: Uuid, update: ProfileUpdate) -> Result<UserProfile> {
        update.validate()?;

        let user = self
            .users
            .update_user(
                actor_id,
                UserChanges {
                    email: update.email,
                    bio: update.bio,
                    profile_picture: update.profile_picture,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string()))?;

        info!(user_id = %actor_id, "profile updated");
        self.profile_of(actor_id, user).await
    }

    /// Case-insensitive username search that never returns the actor.
    /// A blank query returns nothing.
    pub async fn search_users(&self, actor_id: Uuid, username: Option<&str>) -> Result<Vec<UserSummary>> {
        let Some(query) = username.map(str::trim).filter(|q| !q.is_empty()) else {
            return Ok(Vec::new());
        };

        let users = self
            .users
            .search_users(Some(query), actor_id, SEARCH_USERS_LIMIT)
            .await?;
        Ok(users.iter().map(UserSummary::from).collect())
    }

    /// Like `search_users`, but without a query lists up to 20 users
    pub async fn list_users(&self, actor_id: Uuid, username: Option<&str>) -> Result<Vec<UserSummary>> {
        let query = username.map(str::trim).filter(|q| !q.is_empty());
        let users = self
            .users
            .search_users(query, actor_id, LIST_USERS_LIMIT)
            .await?;
        Ok(users.iter().map(UserSummary::from).collect())
    }

    async fn profile_of(&self, viewer_id: Uuid, user: User) -> Result<UserProfile> {
        let (following_count, followers_count) = self.follows.counts(user.id).await?;
        let is_following = viewer_id != user.id && self.follows.is_following(viewer_id, user.id).await?;

        Ok(UserProfile {
            id: user.id,
            username: user.username,
            email: user.email,
            bio: user.bio,
            profile_picture: user.profile_picture,
            following_count,
            followers_count,
            is_following,
        })
    }
}
