/// Comment handlers, both nested under a post and top-level
use crate::domain::requests::{CommentBody, CreateCommentRequest};
use crate::domain::{PageQuery, PageRequest};
use crate::error::Result;
use crate::middleware::UserId;
use crate::services::CommentService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct CommentListQuery {
    pub post: Option<Uuid>,
    pub page: Option<String>,
}

/// GET /api/v1/posts/{id}/comments
pub async fn list_post_comments(
    service: web::Data<CommentService>,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page = service
        .list_comments(Some(path.into_inner()), query.page_request())
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// POST /api/v1/posts/{id}/comments
pub async fn add_post_comment(
    service: web::Data<CommentService>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<CommentBody>,
) -> Result<HttpResponse> {
    let comment = service
        .add_comment(user.0, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// GET /api/v1/comments?post=&page=
pub async fn list_comments(
    service: web::Data<CommentService>,
    query: web::Query<CommentListQuery>,
) -> Result<HttpResponse> {
    let page = PageRequest::from_query(query.page.as_deref());
    let comments = service.list_comments(query.post, page).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// POST /api/v1/comments
pub async fn create_comment(
    service: web::Data<CommentService>,
    user: UserId,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let CreateCommentRequest { post, content } = body.into_inner();
    let comment = service
        .add_comment(user.0, post, CommentBody { content })
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// GET /api/v1/comments/{id}
pub async fn get_comment(
    service: web::Data<CommentService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let comment = service.get_comment(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// PUT/PATCH /api/v1/comments/{id}
pub async fn update_comment(
    service: web::Data<CommentService>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<CommentBody>,
) -> Result<HttpResponse> {
    let comment = service
        .update_comment(user.0, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// DELETE /api/v1/comments/{id}
pub async fn delete_comment(
    service: web::Data<CommentService>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service.delete_comment(user.0, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/posts/{id}/comments")
            .route(web::get().to(list_post_comments))
            .route(web::post().to(add_post_comment)),
    )
    .service(
        web::resource("/comments")
            .route(web::get().to(list_comments))
            .route(web::post().to(create_comment)),
    )
    .service(
        web::resource("/comments/{id}")
            .route(web::get().to(get_comment))
            .route(web::put().to(update_comment))
            .route(web::patch().to(update_comment))
            .route(web::delete().to(delete_comment)),
    );
}
