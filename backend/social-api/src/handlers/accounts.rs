/// Registration, login, profile and user directory handlers
use crate::domain::requests::{LoginRequest, ProfileUpdate, RegisterRequest};
use crate::error::Result;
use crate::middleware::UserId;
use crate::services::AccountService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub username: Option<String>,
}

/// POST /api/v1/auth/register
pub async fn register(
    service: web::Data<AccountService>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let response = service.register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// POST /api/v1/auth/login
pub async fn login(
    service: web::Data<AccountService>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let response = service.login(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/v1/profile
pub async fn get_own_profile(
    service: web::Data<AccountService>,
    user: UserId,
) -> Result<HttpResponse> {
    let profile = service.get_profile(user.0, user.0).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// PUT/PATCH /api/v1/profile
pub async fn update_profile(
    service: web::Data<AccountService>,
    user: UserId,
    body: web::Json<ProfileUpdate>,
) -> Result<HttpResponse> {
    let profile = service.update_profile(user.0, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// GET /api/v1/users?username=
pub async fn list_users(
    service: web::Data<AccountService>,
    user: UserId,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse> {
    let users = service.list_users(user.0, query.username.as_deref()).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/v1/users/search?username=
pub async fn search_users(
    service: web::Data<AccountService>,
    user: UserId,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse> {
    let users = service.search_users(user.0, query.username.as_deref()).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/v1/users/{id}
pub async fn get_user_profile(
    service: web::Data<AccountService>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let profile = service.get_profile(user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/register", web::post().to(register))
        .route("/auth/login", web::post().to(login))
        .service(
            web::resource("/profile")
                .route(web::get().to(get_own_profile))
                .route(web::put().to(update_profile))
                .route(web::patch().to(update_profile)),
        )
        .route("/users", web::get().to(list_users))
        .route("/users/search", web::get().to(search_users))
        .route("/users/{id}", web::get().to(get_user_profile));
}
