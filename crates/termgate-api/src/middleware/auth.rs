//! Bearer-token authentication middleware.
//!
//! Extracts the Authorization header, validates the JWT, and attaches the
//! authenticated user to request extensions. Failures short-circuit with a
//! 401 JSON body; handlers behind this middleware can rely on
//! [`AuthenticatedUser`] being present.

use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage, HttpResponse};
use futures_util::future::LocalBoxFuture;
use log::warn;
use serde_json::json;

use crate::auth::jwt::JwtAuth;
use crate::auth::AuthenticatedUser;

/// Authentication middleware factory.
pub struct AuthMiddleware {
    jwt: Arc<JwtAuth>,
}

impl AuthMiddleware {
    pub fn new(jwt: Arc<JwtAuth>) -> Self {
        Self { jwt }
    }
}

impl<S> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            jwt: self.jwt.clone(),
        }))
    }
}

/// Authentication middleware service instance.
pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    jwt: Arc<JwtAuth>,
}

impl<S> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let jwt = self.jwt.clone();

        Box::pin(async move {
            let auth_header = match req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
            {
                Some(header) => header,
                None => {
                    warn!("Missing Authorization header for {}", req.path());
                    return Ok(unauthorized(req, "Authorization bearer token is required"));
                }
            };

            let token = match JwtAuth::extract_token(&auth_header) {
                Ok(token) => token,
                Err(e) => {
                    warn!("Malformed Authorization header for {}: {}", req.path(), e);
                    return Ok(unauthorized(req, &e.to_string()));
                }
            };

            match jwt.validate_token(token) {
                Ok(claims) => {
                    req.extensions_mut().insert(AuthenticatedUser {
                        username: claims.username,
                    });
                    service.call(req).await
                }
                Err(e) => {
                    warn!("Token validation failed for {}: {}", req.path(), e);
                    Ok(unauthorized(req, "Invalid or expired token"))
                }
            }
        })
    }
}

fn unauthorized(req: ServiceRequest, message: &str) -> ServiceResponse {
    let (req, _) = req.into_parts();
    let response = HttpResponse::Unauthorized().json(json!({ "error": message }));
    ServiceResponse::new(req, response)
}
