// Copyright (c) 2025 - Cowboy AI, Inc.

//! Redis list-backed queue

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::net::SocketAddr;
use tracing::{debug, info};

use super::NeighborQueue;
use crate::config::RedisConfig;
use crate::errors::{SyncError, SyncResult};
use crate::lifecycle::Connector;

/// Queue over one multiplexed Redis connection
pub struct RedisQueue {
    connection: MultiplexedConnection,
    name: String,
}

impl RedisQueue {
    pub fn new(connection: MultiplexedConnection, name: impl Into<String>) -> Self {
        Self {
            connection,
            name: name.into(),
        }
    }
}

#[async_trait]
impl NeighborQueue for RedisQueue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn pop(&mut self) -> SyncResult<Option<String>> {
        let payload: Option<String> = self.connection.lpop(&self.name, None).await?;
        Ok(payload)
    }

    async fn dead_letter(&mut self, queue: &str, payload: &str) -> SyncResult<()> {
        let length: usize = self.connection.rpush(queue, payload).await?;
        debug!(queue = %queue, length, "Dead-lettered payload");
        Ok(())
    }
}

/// Opens [`RedisQueue`]s, resolving the host on every attempt
#[derive(Debug, Clone)]
pub struct RedisConnector {
    config: RedisConfig,
    queue: String,
    label: String,
}

impl RedisConnector {
    pub fn new(config: RedisConfig, queue: impl Into<String>) -> Self {
        let label = format!("redis ({}:{})", config.host, config.port);
        Self {
            config,
            queue: queue.into(),
            label,
        }
    }

    /// Resolve the configured host to one concrete address, preferring IPv4
    pub async fn resolve(&self) -> SyncResult<SocketAddr> {
        let addrs: Vec<SocketAddr> =
            tokio::net::lookup_host((self.config.host.as_str(), self.config.port))
                .await
                .map_err(|e| SyncError::connection("redis", format!("lookup failed: {}", e)))?
                .collect();

        pick_address(&addrs).ok_or_else(|| {
            SyncError::connection(
                "redis",
                format!("no address found for {}", self.config.host),
            )
        })
    }
}

fn pick_address(addrs: &[SocketAddr]) -> Option<SocketAddr> {
    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
}

#[async_trait]
impl Connector for RedisConnector {
    type Connection = RedisQueue;

    fn target(&self) -> &str {
        &self.label
    }

    async fn connect(&self) -> SyncResult<RedisQueue> {
        let addr = self.resolve().await?;
        info!(host = %self.config.host, %addr, "Found redis at {}", addr);

        let client = redis::Client::open(format!("redis://{}/", addr))
            .map_err(|e| SyncError::Configuration(format!("redis address {}: {}", addr, e)))?;
        let connection = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| SyncError::connection("redis", e))?;

        Ok(RedisQueue::new(connection, self.queue.clone()))
    }
}
