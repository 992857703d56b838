//! Server-wide middleware configuration helpers.
//!
//! Keeps the Actix application setup focused by providing reusable
//! constructors for the CORS and request-logging layers.

use actix_cors::Cors;
use actix_web::middleware;

/// Build the CORS middleware. The gateway fronts a browser terminal that may
/// be served from anywhere, so the policy is wide open.
pub fn build_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

/// Build the request logger middleware.
pub fn request_logger() -> middleware::Logger {
    middleware::Logger::default()
}
