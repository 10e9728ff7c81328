// Copyright (c) 2025 - Cowboy AI, Inc.
//! Neighbor Worker
//!
//! Drains neighbor lists from a Redis queue into the PostgreSQL `neighbors`
//! table:
//! - Redis list → DrainLoop → upsert → PostgreSQL
//!
//! Run with: cargo run --bin neighbor-worker
//!
//! Configuration comes from the environment (`DATABASE_URL`, `REDIS_HOST`,
//! `REDIS_PORT`, `NEIGHBOR_QUEUE`, `NEIGHBOR_DEAD_LETTER_QUEUE`,
//! `DRAIN_INTERVAL_MS`, `RECONNECT_DELAY_MS`).

use anyhow::{Context, Result};
use neighbor_sync::{
    queue::RedisConnector, store::PostgresConnector, ConnectionHandle, DecodePolicy, DrainLoop,
    WorkerConfig,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting neighbor worker");

    let config = WorkerConfig::from_env().context("Failed to load worker configuration")?;
    info!(
        db = %config.postgres.describe(),
        redis = %format!("{}:{}", config.redis.host, config.redis.port),
        queue = %config.queue,
        dead_letter = ?config.dead_letter_queue,
        "Configuration loaded"
    );

    let store = ConnectionHandle::open(PostgresConnector::new(&config.postgres), config.retry)
        .await
        .context("Failed to connect to PostgreSQL")?;
    let queue = ConnectionHandle::open(
        RedisConnector::new(config.redis.clone(), config.queue.clone()),
        config.retry,
    )
    .await
    .context("Failed to connect to Redis")?;

    let mut drain = DrainLoop::new(queue, store, config.drain_interval)
        .with_decode_policy(DecodePolicy::from(config.dead_letter_queue.clone()));

    tokio::select! {
        result = drain.run() => {
            result.context("Drain loop stopped")?;
        }
        _ = tokio::signal::ctrl_c() => {
            let stats = drain.stats();
            warn!(
                synchronized = stats.synchronized,
                failed = stats.failed,
                rejected = stats.rejected,
                "Interrupted; shutting down"
            );
        }
    }

    Ok(())
}
