//! BuildForge - Main Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use buildforge_backend::{
    api::{routes, AppState},
    config::Config,
    error::Result,
    services::build_service::BuildService,
    store::{memory::MemoryStore, JobStore},
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    telemetry::init_tracing();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Starting BuildForge backend");

    // Working directories for staged uploads and per-job build output
    tokio::fs::create_dir_all(&config.uploads_dir).await?;
    tokio::fs::create_dir_all(&config.builds_dir).await?;

    let store: Arc<dyn JobStore> = Arc::new(MemoryStore::new());
    let builder = BuildService::new(store.clone(), &config);
    let state = Arc::new(AppState::new(config.clone(), store, builder));

    let app = routes::create_router(state);

    // Start server
    let addr: SocketAddr = config.bind_address.parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
