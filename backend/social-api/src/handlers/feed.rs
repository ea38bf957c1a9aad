use crate::domain::PageQuery;
use crate::error::Result;
use crate::middleware::UserId;
use crate::services::FeedService;
use actix_web::{web, HttpResponse};

/// GET /api/v1/feed?page=N
///
/// Posts from followed accounts, newest first, 10 per page. A bad `page`
/// value falls back to the first page.
pub async fn get_feed(
    service: web::Data<FeedService>,
    user: UserId,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let feed = service.get_feed(user.0, query.page_request()).await?;
    Ok(HttpResponse::Ok().json(feed))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/feed", web::get().to(get_feed));
}
