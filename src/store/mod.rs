// Copyright (c) 2025 - Cowboy AI, Inc.

//! Relational edge storage
//!
//! The [`EdgeStore`] trait is the seam between the synchronization loops and
//! the database. [`postgres::PgEdgeStore`] is the production implementation;
//! tests substitute in-memory stores.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS neighbors (
//!     user_id     INTEGER NOT NULL,
//!     neighbor_id INTEGER NOT NULL,
//!     UNIQUE (user_id, neighbor_id)
//! )
//! ```
//!
//! Rows are append-only. Nothing in this crate updates or deletes them.

pub mod postgres;

use async_trait::async_trait;

use crate::errors::SyncResult;
use crate::model::NeighborEdge;

pub use postgres::{PgEdgeStore, PostgresConnector};

/// Operations the drain loop and broadcaster need from the relational store
#[async_trait]
pub trait EdgeStore: Send {
    /// Create the `neighbors` table if it does not exist
    async fn ensure_schema(&mut self) -> SyncResult<()>;

    /// Number of edges already stored for `user_id`
    async fn count_edges(&mut self, user_id: i32) -> SyncResult<i64>;

    /// Insert one edge.
    ///
    /// A row that collides with an existing one fails with
    /// [`SyncError::UniqueViolation`](crate::errors::SyncError::UniqueViolation).
    async fn insert_edge(&mut self, edge: NeighborEdge) -> SyncResult<()>;

    /// Every stored edge, in the order the store returns them
    async fn all_edges(&mut self) -> SyncResult<Vec<NeighborEdge>>;

    /// Trivial round trip used to detect a dead connection early
    async fn keep_alive(&mut self) -> SyncResult<()>;
}
