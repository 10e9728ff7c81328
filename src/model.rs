// Copyright (c) 2025 - Cowboy AI, Inc.

//! Neighbor data model
//!
//! - [`NeighborMessage`]: one queued computation result for a user
//! - [`NeighborEdge`]: one persisted `(user_id, neighbor_id)` row
//! - [`NeighborSnapshot`]: every edge grouped by user, rebuilt per broadcast

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{SyncError, SyncResult};

/// A decoded queue message: the neighbors computed for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborMessage {
    pub user_id: i32,
    pub neighbor_ids: Vec<i32>,
}

/// Queue payload as the producer writes it.
///
/// `user_id` may arrive as a number (integral floats included) or a numeric
/// string, and `neighbors` is either an array or a string holding a
/// JSON-encoded array.
#[derive(Debug, Deserialize)]
struct WirePayload {
    user_id: IntegerLike,
    neighbors: NeighborList,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IntegerLike {
    Number(i64),
    Float(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NeighborList {
    Ids(Vec<i64>),
    Encoded(String),
}

impl NeighborMessage {
    pub fn new(user_id: i32, neighbor_ids: Vec<i32>) -> Self {
        Self {
            user_id,
            neighbor_ids,
        }
    }

    /// Decode a raw queue payload
    pub fn decode(payload: &str) -> SyncResult<Self> {
        let wire: WirePayload = serde_json::from_str(payload)
            .map_err(|e| SyncError::Decode(format!("invalid payload: {}", e)))?;

        let user_id = match wire.user_id {
            IntegerLike::Number(n) => to_i32("user_id", n)?,
            IntegerLike::Float(f) => integral_to_i32("user_id", f)?,
            IntegerLike::Text(s) => {
                let n = s.trim().parse::<i64>().map_err(|e| {
                    SyncError::Decode(format!("user_id {:?} is not an integer: {}", s, e))
                })?;
                to_i32("user_id", n)?
            }
        };

        let raw_ids = match wire.neighbors {
            NeighborList::Ids(ids) => ids,
            NeighborList::Encoded(s) => serde_json::from_str::<Vec<i64>>(&s)
                .map_err(|e| SyncError::Decode(format!("neighbors {:?}: {}", s, e)))?,
        };

        let neighbor_ids = raw_ids
            .into_iter()
            .map(|n| to_i32("neighbor id", n))
            .collect::<SyncResult<Vec<_>>>()?;

        Ok(Self {
            user_id,
            neighbor_ids,
        })
    }

    /// Edges this message would produce, in message order
    pub fn edges(&self) -> impl Iterator<Item = NeighborEdge> + '_ {
        self.neighbor_ids
            .iter()
            .map(move |&neighbor_id| NeighborEdge::new(self.user_id, neighbor_id))
    }
}

fn to_i32(field: &str, value: i64) -> SyncResult<i32> {
    i32::try_from(value)
        .map_err(|_| SyncError::Decode(format!("{} {} out of INTEGER range", field, value)))
}

fn integral_to_i32(field: &str, value: f64) -> SyncResult<i32> {
    if value.fract() != 0.0 || value < i32::MIN as f64 || value > i32::MAX as f64 {
        return Err(SyncError::Decode(format!("{} {} is not an INTEGER", field, value)));
    }
    Ok(value as i32)
}

/// One row of the `neighbors` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct NeighborEdge {
    pub user_id: i32,
    pub neighbor_id: i32,
}

impl NeighborEdge {
    pub fn new(user_id: i32, neighbor_id: i32) -> Self {
        Self {
            user_id,
            neighbor_id,
        }
    }
}

/// All edges grouped by user.
///
/// Users are ordered by id; each user's neighbors keep the order in which
/// the store returned the rows. Serializes as `{"<user_id>": [ids..]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeighborSnapshot(BTreeMap<i32, Vec<i32>>);

impl NeighborSnapshot {
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = NeighborEdge>,
    {
        let mut users: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
        for edge in edges {
            users.entry(edge.user_id).or_default().push(edge.neighbor_id);
        }
        Self(users)
    }

    pub fn neighbors_of(&self, user_id: i32) -> Option<&[i32]> {
        self.0.get(&user_id).map(Vec::as_slice)
    }

    pub fn user_count(&self) -> usize {
        self.0.len()
    }

    pub fn edge_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<i32, Vec<i32>> {
        &self.0
    }
}
