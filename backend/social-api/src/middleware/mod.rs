/// HTTP middleware utilities for social-api
///
/// Bearer-token authentication and ownership checks. The auth middleware
/// never rejects a request itself: it records the outcome in request
/// extensions and the `UserId` / `MaybeUserId` extractors decide, so public
/// routes stay reachable without a token. A token only authenticates while
/// its subject still exists in the user directory.
pub mod permissions;

pub use permissions::*;

use crate::error::AppError;
use crate::repository::UserRepository;
use crate::security::JwtKeys;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

// =====================================================================
// JWT Authentication
// =====================================================================

/// Authenticated user identifier stored in request extensions after auth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

/// Why a presented token did not yield a user
#[derive(Debug, Clone)]
enum AuthFailure {
    Rejected(String),
    /// Subject lookup failed; surfaced as a server error, not a 401
    Lookup(String),
}

/// Actix middleware that validates `Authorization: Bearer <jwt>` and
/// confirms the subject exists.
pub struct JwtAuthMiddleware {
    keys: Arc<JwtKeys>,
    users: Arc<dyn UserRepository>,
}

impl JwtAuthMiddleware {
    pub fn new(keys: Arc<JwtKeys>, users: Arc<dyn UserRepository>) -> Self {
        Self { keys, users }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            keys: self.keys.clone(),
            users: self.users.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    keys: Arc<JwtKeys>,
    users: Arc<dyn UserRepository>,
}

impl<S> JwtAuthMiddlewareService<S> {
    /// `None` when no Authorization header is present
    fn authenticate(&self, req: &ServiceRequest) -> Option<Result<Uuid, String>> {
        let header = req.headers().get("Authorization")?;

        let outcome = header
            .to_str()
            .map_err(|_| "Invalid Authorization header".to_string())
            .and_then(|value| {
                value
                    .strip_prefix("Bearer ")
                    .ok_or_else(|| "Invalid Authorization scheme".to_string())
            })
            .and_then(|token| {
                self.keys
                    .validate_token(token.trim())
                    .and_then(|claims| claims.user_id())
                    .map_err(|_| "Invalid or expired token".to_string())
            });

        Some(outcome)
    }
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let outcome = self.authenticate(&req);
        let service = self.service.clone();
        let users = self.users.clone();

        Box::pin(async move {
            let failure = match outcome {
                Some(Ok(user_id)) => match users.get_user(user_id).await {
                    Ok(Some(_)) => {
                        req.extensions_mut().insert(UserId(user_id));
                        None
                    }
                    Ok(None) => Some(AuthFailure::Rejected("User not found".to_string())),
                    Err(err) => {
                        tracing::error!(user_id = %user_id, error = %err, "token subject lookup failed");
                        Some(AuthFailure::Lookup(err.to_string()))
                    }
                },
                Some(Err(reason)) => Some(AuthFailure::Rejected(reason)),
                None => None,
            };

            if let Some(failure) = failure {
                if let AuthFailure::Rejected(reason) = &failure {
                    tracing::warn!(path = %req.path(), reason = %reason, "rejected bearer token");
                }
                req.extensions_mut().insert(failure);
            }

            service.call(req).await
        })
    }
}

fn resolve_user(req: &HttpRequest) -> Result<Option<UserId>, AppError> {
    let extensions = req.extensions();
    match extensions.get::<AuthFailure>() {
        Some(AuthFailure::Rejected(reason)) => return Err(AppError::Unauthorized(reason.clone())),
        Some(AuthFailure::Lookup(detail)) => return Err(AppError::Database(detail.clone())),
        None => {}
    }
    Ok(extensions.get::<UserId>().copied())
}

impl FromRequest for UserId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(resolve_user(req).and_then(|user| {
            user.ok_or_else(|| {
                AppError::Unauthorized("Authentication credentials were not provided".to_string())
            })
        }))
    }
}

/// Optional authentication for public routes. A missing token yields
/// `MaybeUserId(None)`; an invalid one is still a 401.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUserId(pub Option<Uuid>);

impl FromRequest for MaybeUserId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(resolve_user(req).map(|user| MaybeUserId(user.map(|u| u.0))))
    }
}
