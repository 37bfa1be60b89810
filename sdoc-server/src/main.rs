//! sdoc-server - SmartDocs pipeline tracker API server

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use sdoc_common::config::{Config, Overrides};
use sdoc_common::db::init_database;
use sdoc_common::paths::StorageLayout;
use sdoc_server::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "sdoc-server", about = "SmartDocs pipeline tracker API server")]
struct Args {
    /// HTTP port (overrides SDOC_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Storage root directory (overrides SDOC_STORAGE_DIR)
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// SQLite database path (overrides SDOC_DATABASE_PATH)
    #[arg(long)]
    database_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting SmartDocs server (sdoc-server) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();
    let config = Config::resolve(&Overrides {
        port: args.port,
        storage_dir: args.storage_dir,
        database_path: args.database_path,
    })?;
    config.log_summary();

    // Storage root must exist before anything is served from or written to it
    std::fs::create_dir_all(&config.storage_dir)?;

    let pool = init_database(&config.database_path).await?;
    info!("Database connection established");

    let state = AppState::new(pool, StorageLayout::new(&config.storage_dir));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.port)).await?;
    info!("Listening on http://127.0.0.1:{}", config.port);
    info!("Health check: http://127.0.0.1:{}/health", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
