//! Authentication building blocks: JWT issue/validate and bcrypt passwords.

pub mod jwt;
pub mod password;

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};

/// Identity attached to the request by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub username: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or_else(|| actix_web::error::ErrorUnauthorized("authentication required")),
        )
    }
}
