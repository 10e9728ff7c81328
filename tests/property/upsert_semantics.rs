// Copyright (c) 2025 - Cowboy AI, Inc.
//! Properties of first-write-wins upserts against the in-memory store

use crate::fixtures::{shared_store, MemoryStore};
use neighbor_sync::{upsert, NeighborEdge, NeighborMessage, UpsertOutcome};
use proptest::prelude::*;
use std::collections::HashSet;

// ============================================================================
// Strategies
// ============================================================================

/// Small id range so duplicate neighbors show up often
fn neighbor_ids() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(0i32..20, 0..30)
}

fn message() -> impl Strategy<Value = NeighborMessage> {
    (any::<i32>(), neighbor_ids()).prop_map(|(user_id, ids)| NeighborMessage::new(user_id, ids))
}

/// First occurrence of each id, in message order
fn distinct_in_order(ids: &[i32]) -> Vec<i32> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: a new user gets one row per distinct neighbor
    ///
    /// Repeated ids within the message are the only uniqueness conflicts and
    /// are counted as skipped.
    #[test]
    fn prop_new_user_inserts_len_minus_conflicts(message in message()) {
        let state = shared_store();
        let mut store = MemoryStore::new(state.clone());

        let outcome = tokio_test::block_on(upsert(&mut store, &message)).unwrap();

        let distinct = distinct_in_order(&message.neighbor_ids);
        prop_assert_eq!(
            outcome,
            UpsertOutcome::Inserted {
                inserted: distinct.len(),
                skipped: message.neighbor_ids.len() - distinct.len(),
            }
        );

        let stored: Vec<i32> = state.lock().unwrap().edges.iter().map(|e| e.neighbor_id).collect();
        prop_assert_eq!(stored, distinct);
    }

    /// Property: a user with any existing edge is never written to
    #[test]
    fn prop_known_user_inserts_nothing(
        message in message(),
        existing in prop::collection::vec(0i32..20, 1..10),
    ) {
        let state = shared_store();
        let seeded: Vec<NeighborEdge> = distinct_in_order(&existing)
            .into_iter()
            .map(|n| NeighborEdge::new(message.user_id, n))
            .collect();
        state.lock().unwrap().edges = seeded.clone();
        let mut store = MemoryStore::new(state.clone());

        let outcome = tokio_test::block_on(upsert(&mut store, &message)).unwrap();

        prop_assert_eq!(outcome, UpsertOutcome::AlreadySynchronized);
        prop_assert_eq!(&state.lock().unwrap().edges, &seeded);
    }

    /// Property: a second identical upsert changes nothing
    #[test]
    fn prop_second_upsert_is_noop(message in message()) {
        let state = shared_store();
        let mut store = MemoryStore::new(state.clone());

        tokio_test::block_on(upsert(&mut store, &message)).unwrap();
        let after_first = state.lock().unwrap().edges.clone();
        let second = tokio_test::block_on(upsert(&mut store, &message)).unwrap();

        prop_assert_eq!(second.rows_written(), 0);
        if !message.neighbor_ids.is_empty() {
            prop_assert_eq!(second, UpsertOutcome::AlreadySynchronized);
        }
        prop_assert_eq!(&state.lock().unwrap().edges, &after_first);
    }

    /// Property: messages for different users never affect each other
    #[test]
    fn prop_users_are_independent(first in message(), second in message()) {
        prop_assume!(first.user_id != second.user_id);
        let state = shared_store();
        let mut store = MemoryStore::new(state.clone());

        tokio_test::block_on(upsert(&mut store, &first)).unwrap();
        let outcome = tokio_test::block_on(upsert(&mut store, &second)).unwrap();

        prop_assert_eq!(
            outcome.rows_written(),
            distinct_in_order(&second.neighbor_ids).len()
        );
        let edges = state.lock().unwrap().edges.clone();
        let first_rows = edges.iter().filter(|e| e.user_id == first.user_id).count();
        prop_assert_eq!(first_rows, distinct_in_order(&first.neighbor_ids).len());
    }
}
