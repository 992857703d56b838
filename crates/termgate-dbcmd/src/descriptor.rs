//! Connection descriptors

use serde::{Deserialize, Serialize};

/// Supported database kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DbKind {
    #[serde(rename = "postgresql")]
    Postgres,
    #[serde(rename = "mysql")]
    Mysql,
    #[serde(rename = "mongodb")]
    Mongo,
    #[serde(rename = "redis")]
    Redis,
    #[serde(rename = "sqlserver")]
    SqlServer,
}

/// Immutable input to the compiler; describes one target server.
///
/// `port` falls back to the kind-specific default when not set by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    pub kind: DbKind,
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub ssl: bool,
}

impl ConnectionDescriptor {
    /// Effective port: the caller's override or the kind default.
    pub fn port(&self) -> u16 {
        self.port
            .unwrap_or_else(|| crate::render::kind_spec(self.kind).default_port)
    }
}
