pub mod api;
pub mod config;
pub mod genai;
pub mod models;
pub mod report;
pub mod server;
pub mod store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::ApiContext;
use crate::genai::GeminiClient;
use crate::store::KvStore;

/// Initialize logging, open the store, connect the chat backend, and serve
/// until interrupted.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let store = KvStore::open(&config::store_path())?;
    let backend = GeminiClient::from_env()?;
    tracing::info!(model = backend.model(), "chat backend configured");

    let ctx = ApiContext::new(store, Arc::new(backend));
    let mut server = server::start_server(ctx, config::bind_addr()).await?;
    tracing::info!(addr = %server.addr, "ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("interrupt received, shutting down");
    server.shutdown();

    Ok(())
}
