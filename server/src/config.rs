// Configuration module
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use termgate_exec::ShellMode;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub exec: ExecSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// 0 means the actix default (one worker per core).
    #[serde(default)]
    pub workers: usize,
}

/// Gateway account and token settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_expiry_hours")]
    pub token_expiry_hours: i64,
}

/// Execution gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecSettings {
    #[serde(default)]
    pub shell: ShellMode,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
    /// Starting directory for clients that do not send a cwd. Empty means
    /// the process home directory.
    #[serde(default)]
    pub default_cwd: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file_path: String,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ExecSettings {
    fn default() -> Self {
        Self {
            shell: ShellMode::Auto,
            timeout_seconds: default_timeout_seconds(),
            max_output_bytes: default_max_output_bytes(),
            default_cwd: String::new(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_path: default_log_file(),
            log_to_console: true,
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_token_expiry_hours() -> i64 {
    24
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_output_bytes() -> usize {
    1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "./logs/termgate.log".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

fn default_true() -> bool {
    true
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let mut config: ServerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides for sensitive configuration
    ///
    /// Supported environment variables:
    /// - TERMGATE_HOST: Override server.host
    /// - TERMGATE_PORT: Override server.port
    /// - TERMGATE_USER: Override auth.username
    /// - TERMGATE_PASSWORD: Override auth.password
    /// - TERMGATE_JWT_SECRET: Override auth.jwt_secret
    /// - TERMGATE_LOG_LEVEL: Override logging.level
    ///
    /// Environment variables take precedence over config.toml values.
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        use std::env;

        if let Ok(host) = env::var("TERMGATE_HOST") {
            self.server.host = host;
        }

        if let Ok(port_str) = env::var("TERMGATE_PORT") {
            self.server.port = port_str
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid TERMGATE_PORT value: {}", port_str))?;
        }

        if let Ok(username) = env::var("TERMGATE_USER") {
            self.auth.username = username;
        }

        if let Ok(password) = env::var("TERMGATE_PASSWORD") {
            self.auth.password = password;
        }

        if let Ok(secret) = env::var("TERMGATE_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Ok(level) = env::var("TERMGATE_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate configuration settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.auth.username.is_empty() {
            return Err(anyhow::anyhow!(
                "auth.username is required (or set TERMGATE_USER)"
            ));
        }

        if self.auth.password.is_empty() {
            return Err(anyhow::anyhow!(
                "auth.password is required (or set TERMGATE_PASSWORD)"
            ));
        }

        if self.auth.jwt_secret.is_empty() {
            return Err(anyhow::anyhow!(
                "auth.jwt_secret is required (or set TERMGATE_JWT_SECRET)"
            ));
        }

        if self.auth.token_expiry_hours <= 0 {
            return Err(anyhow::anyhow!("auth.token_expiry_hours must be positive"));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            ));
        }

        let valid_formats = ["compact", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_formats.join(", ")
            ));
        }

        if self.exec.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("exec.timeout_seconds cannot be 0"));
        }

        if self.exec.max_output_bytes == 0 {
            return Err(anyhow::anyhow!("exec.max_output_bytes cannot be 0"));
        }

        Ok(())
    }

    /// The effective default starting directory: configured value, or the
    /// process home directory, or the filesystem root.
    pub fn default_cwd(&self) -> String {
        if !self.exec.default_cwd.trim().is_empty() {
            return self.exec.default_cwd.clone();
        }
        std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| "/".to_string())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            server: ServerSettings::default(),
            auth: AuthSettings {
                username: String::new(),
                password: String::new(),
                jwt_secret: String::new(),
                token_expiry_hours: default_token_expiry_hours(),
            },
            exec: ExecSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn configured() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.auth.username = "operator".to_string();
        config.auth.password = "secret".to_string();
        config.auth.jwt_secret = "jwt-secret".to_string();
        config
    }

    #[test]
    fn test_configured_config_is_valid() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_missing_credentials_are_rejected() {
        let config = ServerConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_port() {
        let mut config = configured();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = configured();
        config.logging.level = "chatty".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_override_jwt_secret() {
        env::set_var("TERMGATE_JWT_SECRET", "from-env");
        let mut config = configured();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.auth.jwt_secret, "from-env");
        env::remove_var("TERMGATE_JWT_SECRET");
    }

    #[test]
    fn test_env_override_credentials() {
        env::set_var("TERMGATE_USER", "env-user");
        env::set_var("TERMGATE_PASSWORD", "env-pass");
        let mut config = ServerConfig::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.auth.username, "env-user");
        assert_eq!(config.auth.password, "env-pass");
        env::remove_var("TERMGATE_USER");
        env::remove_var("TERMGATE_PASSWORD");
    }

    #[test]
    fn test_from_file_round_trip() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [server]
            port = 4100

            [auth]
            username = "operator"
            password = "secret"
            jwt_secret = "jwt-secret"
            token_expiry_hours = 12

            [exec]
            timeout_seconds = 15
            "#
        )
        .unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 4100);
        assert_eq!(config.auth.token_expiry_hours, 12);
        assert_eq!(config.exec.timeout_seconds, 15);
    }

    #[test]
    fn test_from_file_missing_path_is_an_error() {
        assert!(ServerConfig::from_file("no-such-config.toml").is_err());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_text = r#"
            [auth]
            username = "operator"
            password = "secret"
            jwt_secret = "jwt-secret"

            [exec]
            shell = "sh"
            timeout_seconds = 10
        "#;
        let config: ServerConfig = toml::from_str(toml_text).unwrap();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.exec.shell, ShellMode::Sh);
        assert_eq!(config.exec.timeout_seconds, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_cwd_falls_back_to_home() {
        let mut config = configured();
        config.exec.default_cwd = "/srv/work".to_string();
        assert_eq!(config.default_cwd(), "/srv/work");
        config.exec.default_cwd = String::new();
        assert!(!config.default_cwd().is_empty());
    }
}
