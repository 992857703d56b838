//! Database command rendering handler.
//!
//! POST /api/dbcmd - renders a connection descriptor plus query text into a
//! single executable command line. Render-only; nothing is executed here.

use actix_web::{web, HttpResponse};
use termgate_dbcmd::{render, DbKind};

use crate::auth::AuthenticatedUser;
use crate::models::{DbCommandRequest, DbCommandResponse, ErrorResponse};

/// POST /api/dbcmd
pub async fn dbcmd_handler(
    user: AuthenticatedUser,
    body: web::Json<DbCommandRequest>,
) -> HttpResponse {
    if body.connection.host.trim().is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("Connection host is required"));
    }

    // A structured mongo chain query takes precedence over raw query text.
    let query = match (&body.mongo_query, body.connection.kind) {
        (Some(chain), DbKind::Mongo) => chain.render(),
        _ => body.query.clone(),
    };

    let command = render(&body.connection, &query);
    log::debug!(
        "dbcmd user={} kind={:?} host={}",
        user.username,
        body.connection.kind,
        body.connection.host
    );
    HttpResponse::Ok().json(DbCommandResponse { command })
}
