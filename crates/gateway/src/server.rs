//! Router construction and the server lifecycle: bind, serve, drain on
//! ctrl-c, then persist memories exactly once.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use memory_vector::VectorMemoryStore;
use settings::Settings;
use tower_http::services::ServeDir;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::engine::ConversationEngine;
use crate::gate::ConnectionGate;
use crate::wire::ReadyPayload;
use crate::ws::{ws_upgrade, AppState};

/// Runs the WebSocket server until a stop signal arrives, then saves the
/// memory store. The save happens after the transport has drained, so every
/// in-flight `add_memory` is included.
pub async fn run_server(
    settings: &Settings,
    engine: Arc<ConversationEngine>,
    store: VectorMemoryStore,
) -> Result<()> {
    let server_config = ServerConfig::from_settings(settings);

    let state = AppState {
        gate: Arc::new(ConnectionGate::new()),
        engine,
        ready: ReadyPayload::from_settings(settings),
    };

    let app = Router::new()
        .route("/websocket", get(ws_upgrade))
        .fallback_service(ServeDir::new(&server_config.document_root))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Bind server port {}", server_config.port))?;

    info!(
        port = server_config.port,
        document_root = %server_config.document_root,
        "WebSocket server started, endpoint registered at /websocket"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Serve WebSocket server")?;

    info!("Server drained, persisting memories");
    store.save().await?;
    Ok(())
}

/// Resolves when the process receives ctrl-c. Passed to axum as the
/// graceful-shutdown future; there is no per-request cancellation.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for the stop signal");
        return;
    }
    info!("Stop signal received, preparing to shut down the server");
}
