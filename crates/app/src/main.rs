mod cli;
mod config;
mod http;
mod state;
mod wiring;

use chrono::{Duration, Utc};
use clap::Parser;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::ConfigError;
use crate::http::HttpError;
use crate::wiring::WiringError;
use threadboard_infra::auth::{AuthTokenError, JwtAuthority};
use threadboard_infra::db::run_migrations;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid cli: {0}")]
    InvalidCli(String),
    #[error("wiring error: {0}")]
    Wiring(#[from] WiringError),
    #[error("db error: {0}")]
    Db(#[from] threadboard_infra::db::DbPoolError),
    #[error("http error: {0}")]
    Http(#[from] HttpError),
    #[error("token error: {0}")]
    Token(#[from] AuthTokenError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    config::load_dotenv()?;
    let config = config::AppConfig::from_env()?;

    match cli.into_command() {
        Command::IssueToken { user, ttl_secs } => {
            let secret = config.jwt_secret.as_deref().ok_or_else(|| {
                AppError::InvalidCli("issue-token requires THREADBOARD_JWT_SECRET".to_string())
            })?;
            let token = JwtAuthority::new(secret)?.issue(&user, ttl_secs)?;
            let expires_at = Utc::now() + Duration::seconds(ttl_secs);
            info!(user = %user, expires_at = %expires_at.to_rfc3339(), "token issued");
            println!("{token}");
            Ok(())
        }
        Command::Serve { skip_migrations } => serve(config, skip_migrations).await,
    }
}

async fn serve(config: config::AppConfig, skip_migrations: bool) -> Result<(), AppError> {
    let state = wiring::build_state(config)?;
    if let Some(pool) = state.db.as_ref() {
        if skip_migrations {
            info!("skipping migrations");
        } else {
            run_migrations(pool).await?;
            info!("migrations applied");
        }
    }

    let addr = state.config.http_addr;
    info!(%addr, "http server starting");
    http::serve(addr, state, shutdown_signal()).await?;
    info!("http server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install ctrl-c handler");
    }
    info!("shutdown signal received");
}
