//! imgrank-server - image ranking web service
//!
//! `serve` migrates the tally schema and starts the HTTP server.
//! `init-db` only prepares (or, with `--reset`, wipes) the tally schema.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use imgrank_common::config::{load_config_file, Overrides, Settings};
use imgrank_common::db::{migrate, open_database, reset};
use imgrank_server::session::MemorySessionStore;
use imgrank_server::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for imgrank-server
#[derive(Parser, Debug)]
#[command(name = "imgrank-server")]
#[command(about = "Rank batches of images and keep a points leaderboard")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prepare the database and serve the ranking UI and API
    Serve(SettingsArgs),

    /// Create the tally tables and exit
    InitDb {
        #[command(flatten)]
        settings: SettingsArgs,

        /// Drop all existing points before recreating the tables
        #[arg(long)]
        reset: bool,
    },
}

/// Settings overrides; anything unset falls back to the config file
#[derive(Args, Debug, Clone, Default)]
struct SettingsArgs {
    /// Folder containing the images to rank
    #[arg(long, env = "IMGRANK_IMAGE_FOLDER")]
    image_folder: Option<PathBuf>,

    /// SQLite database file holding the tally
    #[arg(long, env = "IMGRANK_DATABASE")]
    database: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "IMGRANK_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "IMGRANK_PORT")]
    port: Option<u16>,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, env = "IMGRANK_CONFIG")]
    config: Option<PathBuf>,
}

impl SettingsArgs {
    fn resolve(self) -> Result<Settings> {
        let file = load_config_file(self.config.as_deref()).context("Failed to load config file")?;
        let overrides = Overrides {
            image_folder: self.image_folder,
            database: self.database,
            host: self.host,
            port: self.port,
        };
        Ok(Settings::resolve(overrides, file))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imgrank_server=info,imgrank_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    info!("imgrank-server v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Serve(args) => serve(args.resolve()?).await,
        Command::InitDb { settings, reset } => init_db(settings.resolve()?, reset).await,
    }
}

async fn init_db(settings: Settings, wipe: bool) -> Result<()> {
    let pool = open_database(&settings.database)
        .await
        .context("Failed to open database")?;

    if wipe {
        reset(&pool).await.context("Failed to reset database")?;
    } else {
        migrate(&pool).await.context("Failed to migrate database")?;
    }

    info!("Initialized the database: {}", settings.database.display());
    Ok(())
}

async fn serve(settings: Settings) -> Result<()> {
    info!("Image folder: {}", settings.image_folder.display());
    info!("Database: {}", settings.database.display());

    let pool = open_database(&settings.database)
        .await
        .context("Failed to open database")?;

    // Writes require the schema, so it is prepared before accepting traffic
    migrate(&pool).await.context("Failed to migrate database")?;

    let state = AppState::new(
        pool,
        settings.image_folder.clone(),
        Arc::new(MemorySessionStore::new()),
    );
    let app = build_router(state);

    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("imgrank-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

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
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
