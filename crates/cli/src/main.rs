//! `sequence-api` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`        — start the API and health-check servers.
//! - `migrate`      — run pending database migrations.
//! - `check-config` — load and validate the configuration file.

mod config;
mod logging;

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use api::{AppState, JwtAuth, RequestMetrics};
use clap::{Parser, Subcommand};
use db::{PgSequenceStore, SequenceStore};
use service::SequenceService;
use tracing::{error, info};

use crate::config::{Config, DEFAULT_CONFIG_PATH};

#[derive(Parser)]
#[command(
    name = "sequence-api",
    about = "HTTP service for email outreach sequences",
    version
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, global = true, env = "SEQUENCE_API_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Connection URL replacing the `database` section of the config.
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the API server and the health-check server.
    Serve,
    /// Run pending database migrations.
    Migrate,
    /// Validate the configuration file and exit.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    if let Command::CheckConfig = cli.command {
        println!(
            "config {} is valid ({} / {})",
            cli.config.display(),
            config.service_name,
            config.environment
        );
        return Ok(());
    }

    logging::init(&config.logger);
    info!(
        service = %config.service_name,
        environment = %config.environment,
        "configuration loaded"
    );

    let options = config
        .database
        .connect_options(cli.database_url.as_deref())?;
    let pool = db::pool::create_pool(options, config.database.max_connections)
        .await
        .context("failed to connect to database")?;

    match cli.command {
        Command::Serve => serve(&config, pool).await?,
        Command::Migrate => {
            db::pool::run_migrations(&pool)
                .await
                .context("migration failed")?;
            info!("Migrations applied successfully");
            pool.close().await;
        }
        Command::CheckConfig => {}
    }

    Ok(())
}

async fn serve(config: &Config, pool: db::DbPool) -> anyhow::Result<()> {
    let store: Arc<dyn SequenceStore> = Arc::new(PgSequenceStore::new(pool.clone()));
    let metrics = RequestMetrics::new().context("failed to create metrics registry")?;
    let state = AppState {
        service: SequenceService::new(store.clone()),
        metrics: Arc::new(metrics),
    };

    let server = &config.server;
    let jwt = server
        .jwt_authentication
        .then(|| JwtAuth::hs256(&server.jwt_secret));
    if jwt.is_some() {
        info!("jwt authentication enabled");
    }

    let app_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, server.app_server_port));
    let health_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, server.healthcheck_port));

    let served = api::serve(
        app_addr,
        api::app_router(state, jwt),
        health_addr,
        api::health_router(store),
        shutdown_signal(),
    )
    .await;

    pool.close().await;
    served.context("server failed")
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
