//! Login and token verification handlers.
//!
//! POST /api/auth/login - credential check against the configured gateway
//! user, returns a signed JWT.
//! GET /api/auth/verify - confirms the bearer token behind the auth
//! middleware.

use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::auth::password::verify_password;
use crate::auth::AuthenticatedUser;
use crate::models::{ErrorResponse, LoginRequest, LoginResponse, VerifyResponse};
use crate::{GatewayUser, JwtAuth};

/// POST /api/auth/login
pub async fn login_handler(
    user: web::Data<GatewayUser>,
    jwt: web::Data<Arc<JwtAuth>>,
    body: web::Json<LoginRequest>,
) -> HttpResponse {
    if body.username.is_empty() || body.password.is_empty() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::new("Username and password are required"));
    }

    let password_ok = match verify_password(&body.password, &user.password_hash).await {
        Ok(ok) => ok,
        Err(e) => {
            log::error!("Password verification failed: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Authentication failed"));
        }
    };

    if body.username != user.username || !password_ok {
        log::warn!("Rejected login attempt for user '{}'", body.username);
        return HttpResponse::Unauthorized().json(ErrorResponse::new("Invalid credentials"));
    }

    let (token, _claims) = match jwt.sign(&user.username) {
        Ok(signed) => signed,
        Err(e) => {
            log::error!("Error generating JWT: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Failed to generate token"));
        }
    };

    log::info!("User '{}' logged in", user.username);
    HttpResponse::Ok().json(LoginResponse {
        token,
        username: user.username.clone(),
        expires_in: (jwt.expiry_hours() as u64) * 3600,
    })
}

/// GET /api/auth/verify
pub async fn verify_handler(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(VerifyResponse {
        valid: true,
        user: user.username,
    })
}
