// Copyright (c) 2025 - Cowboy AI, Inc.

//! Queue drain loop
//!
//! Every cycle sleeps for the drain interval, re-opens any connection marked
//! broken, then pops at most one payload:
//!
//! ```text
//!             ┌──── payload ────> decode ──> upsert     (Draining)
//!  pop ───────┤
//!             └──── empty ──────> SELECT 1              (Idle)
//! ```
//!
//! Messages are handled strictly in pop order, one at a time. A payload is gone
//! from the queue once popped; if its upsert fails it is logged and lost.

use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::errors::{SyncError, SyncResult};
use crate::lifecycle::{ConnectionHandle, Connector};
use crate::model::NeighborMessage;
use crate::queue::NeighborQueue;
use crate::store::EdgeStore;
use crate::upsert::{upsert, UpsertOutcome};

/// What to do with a payload that does not decode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Log it and move on
    #[default]
    Drop,
    /// Push the raw payload onto the named list
    DeadLetter(String),
}

impl From<Option<String>> for DecodePolicy {
    fn from(queue: Option<String>) -> Self {
        match queue {
            Some(queue) => DecodePolicy::DeadLetter(queue),
            None => DecodePolicy::Drop,
        }
    }
}

/// Result of a single drain cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Queue was empty and the keep-alive query succeeded
    Idle,
    /// A message was written, or was already synchronized
    Synchronized {
        user_id: i32,
        outcome: UpsertOutcome,
    },
    /// A message was popped but its upsert failed
    Failed { user_id: i32, error: String },
    /// A payload could not be decoded
    Rejected { error: String },
    /// A store was unreachable; the handle will reconnect next cycle
    Unavailable { error: String },
}

/// Counters kept across cycles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    pub synchronized: u64,
    pub failed: u64,
    pub rejected: u64,
    pub idle_polls: u64,
}

impl DrainStats {
    fn record(&mut self, outcome: &CycleOutcome) {
        match outcome {
            CycleOutcome::Idle => self.idle_polls += 1,
            CycleOutcome::Synchronized { .. } => self.synchronized += 1,
            CycleOutcome::Failed { .. } => self.failed += 1,
            CycleOutcome::Rejected { .. } => self.rejected += 1,
            CycleOutcome::Unavailable { .. } => {}
        }
    }

    /// Messages popped so far, whatever happened to them
    pub fn messages(&self) -> u64 {
        self.synchronized + self.failed + self.rejected
    }
}

/// Drains a queue into the edge store
pub struct DrainLoop<Q, S>
where
    Q: Connector,
    S: Connector,
{
    queue: ConnectionHandle<Q>,
    store: ConnectionHandle<S>,
    interval: Duration,
    decode_policy: DecodePolicy,
    stats: DrainStats,
}

impl<Q, S> DrainLoop<Q, S>
where
    Q: Connector,
    Q::Connection: NeighborQueue,
    S: Connector,
    S::Connection: EdgeStore,
{
    pub fn new(queue: ConnectionHandle<Q>, store: ConnectionHandle<S>, interval: Duration) -> Self {
        Self {
            queue,
            store,
            interval,
            decode_policy: DecodePolicy::Drop,
            stats: DrainStats::default(),
        }
    }

    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = policy;
        self
    }

    pub fn stats(&self) -> DrainStats {
        self.stats
    }

    pub fn queue_handle(&self) -> &ConnectionHandle<Q> {
        &self.queue
    }

    pub fn store_handle(&self) -> &ConnectionHandle<S> {
        &self.store
    }

    /// Run until a non-recoverable error occurs. There is no clean exit.
    pub async fn run(&mut self) -> SyncResult<()> {
        info!(
            queue = %self.queue.connection().name(),
            interval_ms = self.interval.as_millis() as u64,
            "Starting drain loop"
        );
        loop {
            tokio::time::sleep(self.interval).await;
            let outcome = self.poll_once().await?;

            if !matches!(outcome, CycleOutcome::Idle | CycleOutcome::Unavailable { .. })
                && self.stats.messages() % 100 == 0
            {
                info!(
                    synchronized = self.stats.synchronized,
                    failed = self.stats.failed,
                    rejected = self.stats.rejected,
                    "Drain statistics"
                );
            }
        }
    }

    /// Perform one cycle without the leading sleep.
    ///
    /// Only errors that reconnection cannot fix are returned.
    pub async fn poll_once(&mut self) -> SyncResult<CycleOutcome> {
        self.queue.reconnect_if_needed().await?;
        self.store.reconnect_if_needed().await?;

        let popped = self.queue.connection().pop().await;
        self.queue.observe(&popped);

        let outcome = match popped {
            Ok(Some(payload)) => self.handle_payload(payload).await,
            Ok(None) => self.keep_alive().await,
            Err(e) if e.is_connection() => {
                warn!(store = %self.queue.target(), error = %e, "Queue unavailable");
                CycleOutcome::Unavailable {
                    error: e.to_string(),
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to pop from queue");
                CycleOutcome::Unavailable {
                    error: e.to_string(),
                }
            }
        };

        self.stats.record(&outcome);
        Ok(outcome)
    }

    async fn keep_alive(&mut self) -> CycleOutcome {
        let result = self.store.connection().keep_alive().await;
        self.store.observe(&result);
        match result {
            Ok(()) => CycleOutcome::Idle,
            Err(e) => {
                warn!(error = %e, "Keep-alive query failed");
                CycleOutcome::Unavailable {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn handle_payload(&mut self, payload: String) -> CycleOutcome {
        debug!(payload = %payload, "Received neighbors data");

        let message = match NeighborMessage::decode(&payload) {
            Ok(message) => message,
            Err(e) => return self.reject(payload, e).await,
        };

        let result = upsert(self.store.connection(), &message).await;
        self.store.observe(&result);

        match result {
            Ok(outcome) => {
                info!(
                    user_id = message.user_id,
                    rows = outcome.rows_written(),
                    "Successfully uploaded neighbors to PostgreSQL"
                );
                CycleOutcome::Synchronized {
                    user_id: message.user_id,
                    outcome,
                }
            }
            Err(e) => {
                error!(
                    user_id = message.user_id,
                    error = %e,
                    "Failed to upload neighbors to PostgreSQL"
                );
                CycleOutcome::Failed {
                    user_id: message.user_id,
                    error: e.to_string(),
                }
            }
        }
    }

    async fn reject(&mut self, payload: String, error: SyncError) -> CycleOutcome {
        match &self.decode_policy {
            DecodePolicy::Drop => {
                warn!(error = %error, payload = %payload, "Dropping undecodable message");
            }
            DecodePolicy::DeadLetter(dead_letter) => {
                let dead_letter = dead_letter.clone();
                let pushed = self
                    .queue
                    .connection()
                    .dead_letter(&dead_letter, &payload)
                    .await;
                self.queue.observe(&pushed);
                match pushed {
                    Ok(()) => warn!(
                        error = %error,
                        queue = %dead_letter,
                        "Moved undecodable message to dead-letter queue"
                    ),
                    Err(e) => error!(
                        error = %error,
                        dead_letter_error = %e,
                        payload = %payload,
                        "Failed to dead-letter undecodable message; dropping it"
                    ),
                }
            }
        }

        CycleOutcome::Rejected {
            error: error.to_string(),
        }
    }
}
