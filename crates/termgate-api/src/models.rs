//! Request and response models for the gateway API.

use serde::{Deserialize, Serialize};
use termgate_dbcmd::{ChainQueryDescriptor, ConnectionDescriptor};

/// Login request payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// Token verification response.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: String,
}

/// Command execution request. `cwd` is client-owned; when omitted or empty
/// the configured default starting directory is used.
#[derive(Debug, Deserialize)]
pub struct ExecRequest {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub cwd: Option<String>,
}

/// Query string for file downloads.
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub cwd: Option<String>,
}

/// Upload result payload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub path: String,
    pub size: u64,
}

/// Render request for the db-command compiler.
#[derive(Debug, Deserialize)]
pub struct DbCommandRequest {
    pub connection: ConnectionDescriptor,
    /// Raw query text; empty means "render a connectivity probe".
    #[serde(default)]
    pub query: String,
    /// Structured mongo chain query. When present for a mongo connection it
    /// takes precedence over `query`.
    #[serde(default)]
    pub mongo_query: Option<ChainQueryDescriptor>,
}

/// Rendered command line.
#[derive(Debug, Serialize)]
pub struct DbCommandResponse {
    pub command: String,
}

/// Generic JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Execution defaults shared with the exec and file handlers.
#[derive(Debug, Clone)]
pub struct ExecDefaults {
    /// Starting directory handed to clients that do not send a cwd.
    pub default_cwd: String,
}
