//! foodcraft-kitchen - FoodCraft backend
//!
//! Serves the combination API and game saves over HTTP, and runs the daily
//! retention sweep. Maintenance subcommands run a single task and exit.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use foodcraft_common::config::{database_path, resolve_root_folder, TomlConfig};
use foodcraft_common::db::init_database;
use foodcraft_kitchen::db::{DiscoveryStore, SqliteDiscoveryStore, SqliteGameStateStore};
use foodcraft_kitchen::services::retention::{spawn_sweeper, sweep_once};
use foodcraft_kitchen::{build_router, AppState};

/// Command-line arguments for foodcraft-kitchen
#[derive(Parser, Debug)]
#[command(name = "foodcraft-kitchen")]
#[command(about = "FoodCraft combination resolver and game save service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "FOODCRAFT_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides TOML)
    #[arg(short, long, env = "FOODCRAFT_PORT")]
    port: Option<u16>,

    /// Folder holding foodcraft.db (overrides FOODCRAFT_ROOT_FOLDER and TOML)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Delete idle game saves once and exit
    Sweep,
    /// Delete every cached discovery and exit
    ClearDiscoveries,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    // RUST_LOG wins over the TOML level
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting foodcraft-kitchen v{}",
        env!("CARGO_PKG_VERSION")
    );

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    let db_path = database_path(&root_folder);
    info!("Database: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to open database")?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(pool, &toml_config, args.port).await,
        Command::Sweep => {
            let store = SqliteGameStateStore::new(pool);
            let deleted = sweep_once(&store, toml_config.retention.max_idle()).await?;
            info!("Deleted {} idle game state(s)", deleted);
            Ok(())
        }
        Command::ClearDiscoveries => {
            let store = SqliteDiscoveryStore::new(pool);
            let deleted = store.clear().await?;
            info!("Cleared {} cached discoveries", deleted);
            Ok(())
        }
    }
}

async fn serve(pool: sqlx::SqlitePool, toml_config: &TomlConfig, port: Option<u16>) -> Result<()> {
    let state = AppState::from_config(pool, toml_config)
        .context("Failed to initialize combination resolver")?;

    let cancel = CancellationToken::new();
    let sweeper = spawn_sweeper(
        Arc::clone(&state.games),
        toml_config.retention.clone(),
        cancel.clone(),
    );

    let app = build_router(state);

    let port = port.unwrap_or(toml_config.port);
    let addr: SocketAddr = format!("{}:{}", toml_config.bind_address, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}", toml_config.bind_address))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    cancel.cancel();
    let _ = sweeper.await;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
