// Copyright (c) 2025 - Cowboy AI, Inc.
//! Properties of grouping edges into a snapshot

use neighbor_sync::{NeighborEdge, NeighborSnapshot};
use proptest::prelude::*;

fn edge_sequence() -> impl Strategy<Value = Vec<NeighborEdge>> {
    prop::collection::vec(
        (0i32..10, any::<i32>()).prop_map(|(user, neighbor)| NeighborEdge::new(user, neighbor)),
        0..60,
    )
}

proptest! {
    /// Property: every edge lands in exactly one user's list
    #[test]
    fn prop_grouping_keeps_every_edge(edges in edge_sequence()) {
        let snapshot = NeighborSnapshot::from_edges(edges.clone());

        prop_assert_eq!(snapshot.edge_count(), edges.len());
        prop_assert_eq!(snapshot.is_empty(), edges.is_empty());
    }

    /// Property: each user's neighbors keep store order
    #[test]
    fn prop_grouping_preserves_store_order(edges in edge_sequence()) {
        let snapshot = NeighborSnapshot::from_edges(edges.clone());

        for (user_id, neighbors) in snapshot.as_map() {
            let expected: Vec<i32> = edges
                .iter()
                .filter(|e| e.user_id == *user_id)
                .map(|e| e.neighbor_id)
                .collect();
            prop_assert_eq!(neighbors, &expected);
        }
    }

    /// Property: users are keyed by id and only users with edges appear
    #[test]
    fn prop_grouping_has_one_key_per_user(edges in edge_sequence()) {
        let snapshot = NeighborSnapshot::from_edges(edges.clone());

        let mut users: Vec<i32> = edges.iter().map(|e| e.user_id).collect();
        users.sort_unstable();
        users.dedup();
        let keys: Vec<i32> = snapshot.as_map().keys().copied().collect();
        prop_assert_eq!(keys, users);
    }

    /// Property: serialized keys are the decimal user ids
    #[test]
    fn prop_snapshot_serializes_as_object(edges in edge_sequence()) {
        let snapshot = NeighborSnapshot::from_edges(edges);
        let json = serde_json::to_value(&snapshot).unwrap();
        let object = json.as_object().unwrap();

        prop_assert_eq!(object.len(), snapshot.user_count());
        for (user_id, neighbors) in snapshot.as_map() {
            prop_assert_eq!(&object[&user_id.to_string()], &serde_json::json!(neighbors));
        }
    }
}
