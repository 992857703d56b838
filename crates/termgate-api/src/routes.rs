//! API routes configuration
//!
//! - GET  /health             - liveness probe (public)
//! - POST /api/auth/login     - credential login (public)
//! - GET  /api/auth/verify    - token check (bearer)
//! - POST /api/exec           - command execution (bearer)
//! - GET  /api/download       - file download (bearer)
//! - POST /api/upload         - multipart file upload (bearer)
//! - POST /api/dbcmd          - database command rendering (bearer)

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::auth::jwt::JwtAuth;
use crate::handlers;
use crate::middleware::AuthMiddleware;

/// Configure all gateway routes. Everything under `/api` except login sits
/// behind the bearer-token middleware.
pub fn configure_routes(cfg: &mut web::ServiceConfig, jwt: Arc<JwtAuth>) {
    cfg.route("/health", web::get().to(health_handler));
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/login", web::post().to(handlers::login_handler))
                    .service(
                        web::scope("")
                            .wrap(AuthMiddleware::new(jwt.clone()))
                            .route("/verify", web::get().to(handlers::verify_handler)),
                    ),
            )
            .service(
                web::scope("")
                    .wrap(AuthMiddleware::new(jwt))
                    .route("/exec", web::post().to(handlers::exec_handler))
                    .route("/download", web::get().to(handlers::download_handler))
                    .route("/upload", web::post().to(handlers::upload_handler))
                    .route("/dbcmd", web::post().to(handlers::dbcmd_handler)),
            ),
    );
}

async fn health_handler() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
