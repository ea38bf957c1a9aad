/// Post and like handlers
use crate::domain::requests::{CreatePostRequest, UpdatePostRequest};
use crate::domain::PostListQuery;
use crate::domain::PageRequest;
use crate::error::Result;
use crate::middleware::{MaybeUserId, UserId};
use crate::services::{LikeService, PostService};
use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

/// GET /api/v1/posts?search=&author=&ordering=&page=
pub async fn list_posts(
    service: web::Data<PostService>,
    viewer: MaybeUserId,
    query: web::Query<PostListQuery>,
) -> Result<HttpResponse> {
    let page = PageRequest::from_query(query.page.as_deref());
    let posts = service.list_posts(viewer.0, &query.filter(), page).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// POST /api/v1/posts
pub async fn create_post(
    service: web::Data<PostService>,
    user: UserId,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let post = service.create_post(user.0, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

/// GET /api/v1/posts/{id}
pub async fn get_post(
    service: web::Data<PostService>,
    viewer: MaybeUserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = service.get_post(viewer.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PUT/PATCH /api/v1/posts/{id}
pub async fn update_post(
    service: web::Data<PostService>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    let post = service
        .update_post(user.0, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/v1/posts/{id}
pub async fn delete_post(
    service: web::Data<PostService>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service.delete_post(user.0, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/v1/posts/{id}/like
pub async fn like_post(
    likes: web::Data<LikeService>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post_id = path.into_inner();
    likes.like(user.0, post_id).await?;
    let like_count = likes.like_count(post_id).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Post liked",
        "like_count": like_count,
    })))
}

/// POST /api/v1/posts/{id}/unlike
pub async fn unlike_post(
    likes: web::Data<LikeService>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post_id = path.into_inner();
    likes.unlike(user.0, post_id).await?;
    let like_count = likes.like_count(post_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Post unliked",
        "like_count": like_count,
    })))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/posts")
            .route(web::get().to(list_posts))
            .route(web::post().to(create_post)),
    )
    .service(
        web::resource("/posts/{id}")
            .route(web::get().to(get_post))
            .route(web::put().to(update_post))
            .route(web::patch().to(update_post))
            .route(web::delete().to(delete_post)),
    )
    .route("/posts/{id}/like", web::post().to(like_post))
    .route("/posts/{id}/unlike", web::post().to(unlike_post));
}
