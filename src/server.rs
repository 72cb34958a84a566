//! HTTP server lifecycle — bind, spawn, graceful shutdown.
//!
//! Pattern: bind → spawn background task → return handle with shutdown
//! channel. The handle's owner decides when the server stops.

use std::net::SocketAddr;

use tokio::sync::oneshot;

use crate::api::{api_router, ApiContext};

/// Handle to a running server.
pub struct AppServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl AppServer {
    /// Shut down the server gracefully. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("server shutdown signal sent");
        }
    }
}

/// Bind to `addr` and serve the API in a background task.
///
/// Passing port 0 binds an ephemeral port; the actual address is in the
/// returned handle.
pub async fn start_server(ctx: ApiContext, addr: SocketAddr) -> Result<AppServer, String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind server: {e}"))?;
    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    let app = api_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("server received shutdown signal");
        };

        tracing::info!(%addr, "server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("server error: {e}");
        }

        tracing::info!("server stopped");
    });

    Ok(AppServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}
