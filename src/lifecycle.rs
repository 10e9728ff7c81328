// Copyright (c) 2025 - Cowboy AI, Inc.

//! Connection lifecycle management
//!
//! Both loops hold their store connections in a [`ConnectionHandle`]. A handle
//! owns the [`Connector`] that produced its connection, so it can re-open the
//! connection inline when an operation reports that it died.
//!
//! ```text
//!   acquire ──ok──> Open ──connection error──> Broken
//!      ▲                                          │
//!      └──────────── reconnect_if_needed ─────────┘
//! ```
//!
//! Acquisition retries connection-class failures forever with a fixed delay.
//! Any other failure (a malformed DSN, say) is returned so startup can abort.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::RetryPolicy;
use crate::errors::SyncResult;

/// Something that can open a fresh connection to one store
#[async_trait]
pub trait Connector: Send + Sync {
    /// The live connection type
    type Connection: Send;

    /// Human-readable store name used in logs
    fn target(&self) -> &str;

    /// Make one connection attempt
    async fn connect(&self) -> SyncResult<Self::Connection>;
}

/// Open a connection, retrying connection failures until one succeeds
pub async fn acquire<C>(connector: &C, policy: RetryPolicy) -> SyncResult<C::Connection>
where
    C: Connector + ?Sized,
{
    let mut attempt: u64 = 0;
    loop {
        attempt += 1;
        match connector.connect().await {
            Ok(connection) => {
                info!(store = %connector.target(), attempt, "Connected to {}", connector.target());
                return Ok(connection);
            }
            Err(e) if e.is_connection() => {
                warn!(
                    store = %connector.target(),
                    attempt,
                    error = %e,
                    "Waiting for {}",
                    connector.target()
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Owned, reassignable connection to one store
pub struct ConnectionHandle<C: Connector> {
    connector: C,
    policy: RetryPolicy,
    connection: C::Connection,
    broken: bool,
    reconnects: u64,
}

impl<C: Connector> ConnectionHandle<C> {
    /// Acquire the first connection
    pub async fn open(connector: C, policy: RetryPolicy) -> SyncResult<Self> {
        let connection = acquire(&connector, policy).await?;
        Ok(Self {
            connector,
            policy,
            connection,
            broken: false,
            reconnects: 0,
        })
    }

    pub fn target(&self) -> &str {
        self.connector.target()
    }

    /// The current connection
    pub fn connection(&mut self) -> &mut C::Connection {
        &mut self.connection
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Flag the connection as dead so the next cycle re-opens it
    pub fn mark_broken(&mut self) {
        if !self.broken {
            debug!(store = %self.connector.target(), "Connection marked broken");
        }
        self.broken = true;
    }

    /// Mark the handle broken if `result` carries a connection error
    pub fn observe<T>(&mut self, result: &SyncResult<T>) {
        if let Err(e) = result {
            if e.is_connection() {
                self.mark_broken();
            }
        }
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Number of times the connection has been replaced
    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    /// Re-open the connection if it was marked broken.
    ///
    /// Returns `true` when a new connection was acquired.
    pub async fn reconnect_if_needed(&mut self) -> SyncResult<bool> {
        if !self.broken {
            return Ok(false);
        }

        info!(store = %self.connector.target(), "Reconnecting {}", self.connector.target());
        self.connection = acquire(&self.connector, self.policy).await?;
        self.broken = false;
        self.reconnects += 1;
        Ok(true)
    }
}
