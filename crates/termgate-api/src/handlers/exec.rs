//! Command execution handler.
//!
//! POST /api/exec - runs one command through the execution gateway. The
//! client owns the working directory; an omitted or empty `cwd` falls back
//! to the configured default starting directory.

use actix_web::{web, HttpResponse};
use termgate_exec::{ExecGateway, ExecutionRequest};

use crate::auth::AuthenticatedUser;
use crate::models::{ErrorResponse, ExecDefaults, ExecRequest};

/// POST /api/exec
pub async fn exec_handler(
    user: AuthenticatedUser,
    gateway: web::Data<ExecGateway>,
    defaults: web::Data<ExecDefaults>,
    body: web::Json<ExecRequest>,
) -> HttpResponse {
    let command = body.command.trim();
    if command.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("Command is required"));
    }

    let cwd = match body.cwd.as_deref() {
        Some(cwd) if !cwd.trim().is_empty() => cwd.to_string(),
        _ => defaults.default_cwd.clone(),
    };

    log::info!("exec user={} cwd={} command={}", user.username, cwd, command);

    let result = gateway
        .run(&ExecutionRequest {
            command: command.to_string(),
            cwd,
        })
        .await;

    HttpResponse::Ok().json(result)
}
