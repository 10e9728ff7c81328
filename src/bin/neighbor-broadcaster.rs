// Copyright (c) 2025 - Cowboy AI, Inc.
//! Neighbor Broadcaster
//!
//! Polls the PostgreSQL `neighbors` table and pushes the grouped snapshot to
//! every WebSocket client connected on `/ws`. Also serves the static page
//! assets from `STATIC_DIR`.
//!
//! Run with: cargo run --bin neighbor-broadcaster
//!
//! Configuration comes from the environment (`DATABASE_URL`, `BIND_ADDR` or
//! `PORT`, `BROADCAST_INTERVAL_MS`, `STATIC_DIR`, `RECONNECT_DELAY_MS`).

use anyhow::{Context, Result};
use neighbor_sync::{
    broadcast::{create_router, SnapshotPoller, SubscriptionHub},
    store::PostgresConnector,
    BroadcasterConfig, ConnectionHandle,
};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting neighbor broadcaster");

    let config =
        BroadcasterConfig::from_env().context("Failed to load broadcaster configuration")?;
    info!(
        db = %config.postgres.describe(),
        bind = %config.bind_addr,
        static_dir = %config.static_dir.display(),
        "Configuration loaded"
    );

    let hub = Arc::new(SubscriptionHub::new(64));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    let app = create_router(Arc::clone(&hub), &config.static_dir);
    info!("App running on {}", config.bind_addr);

    let store = ConnectionHandle::open(PostgresConnector::new(&config.postgres), config.retry);
    let interval = config.broadcast_interval;
    let poller_hub = Arc::clone(&hub);
    let poller = tokio::spawn(async move {
        let mut poller = SnapshotPoller::new(store.await?, poller_hub, interval);
        poller.run().await
    });

    tokio::select! {
        result = axum::serve(listener, app) => {
            result.context("HTTP server failed")?;
        }
        result = poller => {
            match result {
                Ok(Ok(())) => warn!("Snapshot poller exited"),
                Ok(Err(e)) => {
                    error!(error = %e, "Snapshot poller stopped");
                    return Err(e).context("Snapshot poller stopped");
                }
                Err(e) => return Err(e).context("Snapshot poller panicked"),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            warn!(published = hub.published(), "Interrupted; shutting down");
        }
    }

    Ok(())
}
