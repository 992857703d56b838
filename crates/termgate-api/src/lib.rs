//! TermGate HTTP API
//!
//! Routes, authentication middleware, and request handlers for the gateway.
//! The execution core lives in `termgate-exec`; this crate only maps HTTP
//! requests onto it and shapes the JSON responses.

pub mod auth;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;

pub use auth::jwt::JwtAuth;
pub use auth::AuthenticatedUser;
pub use routes::configure_routes;

/// The single account allowed through the gateway, configured at startup.
/// The password is bcrypt-hashed before this struct is constructed.
#[derive(Debug, Clone)]
pub struct GatewayUser {
    pub username: String,
    pub password_hash: String,
}
