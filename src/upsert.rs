// Copyright (c) 2025 - Cowboy AI, Inc.

//! Neighbor upsert engine
//!
//! Writes the edges of one [`NeighborMessage`] with a first-write-wins rule:
//!
//! 1. If any edge already exists for the user, nothing is written and the
//!    message counts as synchronized, even if its neighbor list differs.
//! 2. Otherwise each neighbor is inserted in message order. A row that
//!    violates uniqueness is skipped; any other failure aborts the rest of the
//!    message.
//!
//! The count-then-insert sequence is not atomic. Only one worker may drain a
//! given queue into a given store.

use tracing::{debug, info};

use crate::errors::{SyncError, SyncResult};
use crate::model::NeighborMessage;
use crate::store::EdgeStore;

/// What an upsert did with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The user already had edges; nothing was written
    AlreadySynchronized,
    /// Edges were written for a previously unseen user
    Inserted {
        /// Rows written
        inserted: usize,
        /// Rows skipped because they already existed
        skipped: usize,
    },
}

impl UpsertOutcome {
    /// Rows this upsert added to the store
    pub fn rows_written(&self) -> usize {
        match self {
            UpsertOutcome::AlreadySynchronized => 0,
            UpsertOutcome::Inserted { inserted, .. } => *inserted,
        }
    }
}

/// Write `message` into `store`.
///
/// `Ok` means the message is synchronized. `Err` means a non-uniqueness
/// failure stopped it partway; rows written before the failure stay.
pub async fn upsert<S>(store: &mut S, message: &NeighborMessage) -> SyncResult<UpsertOutcome>
where
    S: EdgeStore + ?Sized,
{
    let existing = store.count_edges(message.user_id).await?;
    if existing > 0 {
        info!(
            user_id = message.user_id,
            existing, "Neighbors already exist for user; skipping insertion"
        );
        return Ok(UpsertOutcome::AlreadySynchronized);
    }

    let mut inserted = 0;
    let mut skipped = 0;
    for edge in message.edges() {
        match store.insert_edge(edge).await {
            Ok(()) => inserted += 1,
            Err(SyncError::UniqueViolation(detail)) => {
                debug!(
                    user_id = edge.user_id,
                    neighbor_id = edge.neighbor_id,
                    %detail,
                    "Edge already present; skipping"
                );
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(UpsertOutcome::Inserted { inserted, skipped })
}
