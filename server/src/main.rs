// TermGate server entrypoint
//
// Loads configuration, initializes logging, hashes the gateway password, and
// wires the HTTP surface from termgate-api onto an actix-web server.

mod config;
mod logging;
mod middleware;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use config::ServerConfig;
use log::info;
use termgate_api::models::ExecDefaults;
use termgate_api::{auth::password::hash_password, configure_routes, GatewayUser, JwtAuth};
use termgate_exec::{ExecGateway, GatewayConfig};

#[derive(Parser, Debug)]
#[command(name = "termgate-server", version, about = "Stateless web-terminal command gateway")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match ServerConfig::from_file(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) if !cli.config.exists() => {
            // No config file: run on defaults plus environment overrides.
            eprintln!("Config file {} not found ({}), using defaults", cli.config.display(), e);
            let mut cfg = ServerConfig::default();
            cfg.apply_env_overrides()?;
            cfg.validate()?;
            cfg
        }
        Err(e) => {
            eprintln!("Failed to load {}: {}", cli.config.display(), e);
            std::process::exit(1);
        }
    };

    // Logging before any other side effects
    logging::init_logging(
        &config.logging.level,
        &config.logging.file_path,
        config.logging.log_to_console,
        &config.logging.format,
    )?;

    info!("TermGate v{}", env!("CARGO_PKG_VERSION"));
    info!("Host: {}  Port: {}", config.server.host, config.server.port);

    // The configured password is only ever held as a bcrypt hash from here on.
    let password_hash = hash_password(&config.auth.password)
        .await
        .context("failed to hash gateway password")?;
    let gateway_user = web::Data::new(GatewayUser {
        username: config.auth.username.clone(),
        password_hash,
    });

    let jwt = Arc::new(JwtAuth::new(
        config.auth.jwt_secret.clone(),
        config.auth.token_expiry_hours,
    ));
    let jwt_data = web::Data::new(jwt.clone());

    let gateway = web::Data::new(ExecGateway::new(GatewayConfig {
        shell_mode: config.exec.shell,
        timeout: Duration::from_secs(config.exec.timeout_seconds),
        max_output_bytes: config.exec.max_output_bytes,
    }));

    let defaults = web::Data::new(ExecDefaults {
        default_cwd: config.default_cwd(),
    });
    info!("Default working directory: {}", defaults.default_cwd);

    let bind_addr = (config.server.host.clone(), config.server.port);
    let workers = config.server.workers;

    let mut server = HttpServer::new(move || {
        let jwt = jwt.clone();
        App::new()
            .wrap(middleware::build_cors())
            .wrap(middleware::request_logger())
            .app_data(gateway_user.clone())
            .app_data(jwt_data.clone())
            .app_data(gateway.clone())
            .app_data(defaults.clone())
            .configure(move |cfg| configure_routes(cfg, jwt))
    })
    .bind((bind_addr.0.as_str(), bind_addr.1))
    .with_context(|| format!("failed to bind {}:{}", bind_addr.0, bind_addr.1))?;

    if workers > 0 {
        server = server.workers(workers);
    }

    info!("TermGate listening on {}:{}", bind_addr.0, bind_addr.1);
    server.run().await.context("server error")
}
