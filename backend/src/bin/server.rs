//! M7Box HTTP Server Binary
//!
//! Loads configuration, sets up the in-memory session store and the HTTP
//! router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin m7box-server
//! M7BOX_CONFIG=./m7box.toml PORT=9000 cargo run --bin m7box-server
//! ```
//!
//! # Environment Variables
//!
//! - `M7BOX_CONFIG`: Configuration file (default: search for `m7box.toml`)
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `RUST_LOG`: Log filter (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use m7box_stats::config::AppConfig;
use m7box_stats::db::repositories::LocalRepository;
use m7box_stats::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Also captures `log` records from the library.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting M7Box HTTP Server");

    let config = AppConfig::load()?;
    info!(
        retracement_width = config.binning.retracement_width,
        extension_width = config.binning.extension_width,
        "Configuration loaded"
    );

    let repository = Arc::new(LocalRepository::new());
    let state = AppState::new(repository, &config);
    let app = create_router(state);

    let addr: SocketAddr = config.bind_address().parse()?;
    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
