// Copyright (c) 2025 - Cowboy AI, Inc.

//! Neighbor synchronization pipeline
//!
//! Moves neighbor lists produced by an upstream recommender from a Redis
//! queue into PostgreSQL, and republishes the stored state to live WebSocket
//! clients.
//!
//! ```text
//! producer ──> Redis list ──> DrainLoop ──> upsert ──> neighbors table
//!                                                          │
//!                   WebSocket clients <── SnapshotPoller <─┘
//! ```
//!
//! # Modules
//!
//! - [`lifecycle`] - reconnecting connection handles
//! - [`queue`] - the Redis-backed message queue
//! - [`store`] - the PostgreSQL edge store
//! - [`upsert`] - first-write-wins edge insertion
//! - [`drain`] - the queue drain loop
//! - [`broadcast`] - snapshot polling and the WebSocket server
//!
//! # Delivery
//!
//! Messages are popped destructively. A crash between pop and write loses the
//! message, and a user whose edges already exist is never updated. Run a
//! single worker per queue: the duplicate check is not atomic across workers.

pub mod broadcast;
pub mod config;
pub mod drain;
pub mod errors;
pub mod lifecycle;
pub mod model;
pub mod queue;
pub mod store;
pub mod upsert;

// Re-export commonly used types
pub use config::{BroadcasterConfig, RetryPolicy, WorkerConfig};
pub use drain::{CycleOutcome, DecodePolicy, DrainLoop};
pub use errors::{SyncError, SyncResult};
pub use lifecycle::{acquire, ConnectionHandle, Connector};
pub use model::{NeighborEdge, NeighborMessage, NeighborSnapshot};
pub use queue::NeighborQueue;
pub use store::EdgeStore;
pub use upsert::{upsert, UpsertOutcome};
