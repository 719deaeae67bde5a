use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cli::utils::connect_store;
use crate::config;
use crate::database::{MemoryStore, Store};
use crate::is_production;
use crate::server;
use crate::state::AppState;

pub async fn handle(in_memory: bool) -> anyhow::Result<()> {
    let config = config::config().clone();
    info!("Starting profreg API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = if in_memory {
        if is_production!() {
            warn!("Running with the in-memory store in production; data will not survive a restart");
        }
        Arc::new(MemoryStore::new())
    } else {
        connect_store(&config).await?
    };

    let port = config.api.port;
    let state = AppState::new(config, store).context("invalid security configuration")?;

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, server::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
