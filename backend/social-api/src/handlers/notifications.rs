/// Notification handlers - every route is scoped to the authenticated recipient
use crate::domain::requests::NotificationUpdate;
use crate::domain::PageQuery;
use crate::error::Result;
use crate::middleware::UserId;
use crate::services::NotificationService;
use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

/// GET /api/v1/notifications?page=N
pub async fn list_notifications(
    service: web::Data<NotificationService>,
    user: UserId,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page = service.list(user.0, query.page_request()).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/v1/notifications/stats
pub async fn notification_stats(
    service: web::Data<NotificationService>,
    user: UserId,
) -> Result<HttpResponse> {
    let stats = service.stats(user.0).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// POST /api/v1/notifications/mark-all-read
pub async fn mark_all_read(
    service: web::Data<NotificationService>,
    user: UserId,
) -> Result<HttpResponse> {
    let updated = service.mark_all_read(user.0).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "All notifications marked as read",
        "updated": updated,
    })))
}

/// GET /api/v1/notifications/{id}
pub async fn get_notification(
    service: web::Data<NotificationService>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let notification = service.get(user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(notification))
}

/// PATCH /api/v1/notifications/{id}
pub async fn update_notification(
    service: web::Data<NotificationService>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<NotificationUpdate>,
) -> Result<HttpResponse> {
    let notification = service
        .set_read(user.0, path.into_inner(), body.read)
        .await?;
    Ok(HttpResponse::Ok().json(notification))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/notifications", web::get().to(list_notifications))
        .route("/notifications/stats", web::get().to(notification_stats))
        .route("/notifications/mark-all-read", web::post().to(mark_all_read))
        .service(
            web::resource("/notifications/{id}")
                .route(web::get().to(get_notification))
                .route(web::patch().to(update_notification)),
        );
}
