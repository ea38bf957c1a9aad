/// Follow graph handlers
use crate::error::Result;
use crate::middleware::UserId;
use crate::services::FollowService;
use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

/// POST /api/v1/follow/{user_id}
pub async fn follow_user(
    service: web::Data<FollowService>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let followee = service.follow(user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("You are now following {}", followee.username),
    })))
}

/// POST /api/v1/unfollow/{user_id}
pub async fn unfollow_user(
    service: web::Data<FollowService>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let followee = service.unfollow(user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("You have unfollowed {}", followee.username),
    })))
}

/// GET /api/v1/following
pub async fn list_following(
    service: web::Data<FollowService>,
    user: UserId,
) -> Result<HttpResponse> {
    let users = service.list_following(user.0).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/v1/followers
pub async fn list_followers(
    service: web::Data<FollowService>,
    user: UserId,
) -> Result<HttpResponse> {
    let users = service.list_followers(user.0).await?;
    Ok(HttpResponse::Ok().json(users))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/follow/{user_id}", web::post().to(follow_user))
        .route("/unfollow/{user_id}", web::post().to(unfollow_user))
        .route("/following", web::get().to(list_following))
        .route("/followers", web::get().to(list_followers));
}
