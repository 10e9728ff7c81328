// Copyright (c) 2025 - Cowboy AI, Inc.

//! Queue of pending neighbor messages
//!
//! Messages are consumed destructively: a pop removes the payload from the
//! queue before it is decoded or written, so there is no acknowledgement step.

pub mod redis;

use async_trait::async_trait;

use crate::errors::SyncResult;

pub use self::redis::{RedisConnector, RedisQueue};

/// A named list of raw message payloads
#[async_trait]
pub trait NeighborQueue: Send {
    /// Name of the list being drained
    fn name(&self) -> &str;

    /// Remove and return the leftmost payload, or `None` if the list is empty.
    ///
    /// Never blocks waiting for a message.
    async fn pop(&mut self) -> SyncResult<Option<String>>;

    /// Append a payload that could not be decoded to `queue`
    async fn dead_letter(&mut self, queue: &str, payload: &str) -> SyncResult<()>;
}
