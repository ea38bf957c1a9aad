/// HTTP handlers, mounted under `/api/v1`
pub mod accounts;
pub mod comments;
pub mod feed;
pub mod follows;
pub mod notifications;
pub mod posts;

use crate::error::AppError;
use actix_web::{error::InternalError, web, HttpRequest, ResponseError};

/// Mount every API route. Static segments are registered before `{id}`
/// segments within each module.
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(accounts::register_routes)
            .configure(follows::register_routes)
            .configure(posts::register_routes)
            .configure(comments::register_routes)
            .configure(feed::register_routes)
            .configure(notifications::register_routes),
    );
}

fn bad_request<E>(err: E) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let response = AppError::BadRequest(err.to_string()).error_response();
    InternalError::from_response(err, response).into()
}

/// Malformed JSON bodies become 400s in the standard error shape
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| bad_request(err))
}

/// Unparseable query strings become 400s in the standard error shape
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| bad_request(err))
}
