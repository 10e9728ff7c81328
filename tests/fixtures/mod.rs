//! In-memory stand-ins for Redis and PostgreSQL
//!
//! Each fake shares its state through an `Arc<Mutex<..>>` so a test can keep
//! inspecting (and sabotaging) it after the connection has been moved into a
//! loop.

#![allow(dead_code)]

use async_trait::async_trait;
use neighbor_sync::{Connector, EdgeStore, NeighborEdge, NeighborQueue, SyncError, SyncResult};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn connection_error(target: &str) -> SyncError {
    SyncError::Connection {
        target: target.to_string(),
        message: "connection reset by peer".to_string(),
    }
}

/// State behind every [`MemoryStore`] opened by one connector
#[derive(Debug, Default)]
pub struct StoreState {
    /// Rows in insertion order
    pub edges: Vec<NeighborEdge>,
    pub schema_checks: usize,
    pub count_queries: usize,
    pub keep_alives: usize,
    pub full_scans: usize,
    /// Reject duplicate `(user_id, neighbor_id)` rows
    pub enforce_unique: bool,
    /// Neighbor ids whose insert fails with a non-uniqueness error
    pub poisoned_neighbors: HashSet<i32>,
    /// Fail the next operation with a connection error
    pub drop_next: bool,
    /// Fail full scans with a query error
    pub fail_scans: bool,
}

impl StoreState {
    fn take_drop(&mut self) -> SyncResult<()> {
        if self.drop_next {
            self.drop_next = false;
            return Err(connection_error("memory-db"));
        }
        Ok(())
    }
}

pub type SharedStore = Arc<Mutex<StoreState>>;

pub fn shared_store() -> SharedStore {
    Arc::new(Mutex::new(StoreState {
        enforce_unique: true,
        ..StoreState::default()
    }))
}

pub struct MemoryStore {
    state: SharedStore,
}

impl MemoryStore {
    pub fn new(state: SharedStore) -> Self {
        Self { state }
    }
}

#[async_trait]
impl EdgeStore for MemoryStore {
    async fn ensure_schema(&mut self) -> SyncResult<()> {
        self.state.lock().unwrap().schema_checks += 1;
        Ok(())
    }

    async fn count_edges(&mut self, user_id: i32) -> SyncResult<i64> {
        let mut state = self.state.lock().unwrap();
        state.take_drop()?;
        state.count_queries += 1;
        Ok(state.edges.iter().filter(|e| e.user_id == user_id).count() as i64)
    }

    async fn insert_edge(&mut self, edge: NeighborEdge) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        state.take_drop()?;
        if state.poisoned_neighbors.contains(&edge.neighbor_id) {
            return Err(SyncError::Database(format!(
                "value {} violates check constraint",
                edge.neighbor_id
            )));
        }
        if state.enforce_unique && state.edges.contains(&edge) {
            return Err(SyncError::UniqueViolation(format!(
                "duplicate key ({}, {})",
                edge.user_id, edge.neighbor_id
            )));
        }
        state.edges.push(edge);
        Ok(())
    }

    async fn all_edges(&mut self) -> SyncResult<Vec<NeighborEdge>> {
        let mut state = self.state.lock().unwrap();
        state.take_drop()?;
        if state.fail_scans {
            return Err(SyncError::Database("relation \"neighbors\" is locked".to_string()));
        }
        state.full_scans += 1;
        Ok(state.edges.clone())
    }

    async fn keep_alive(&mut self) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        state.take_drop()?;
        state.keep_alives += 1;
        Ok(())
    }
}

/// Opens [`MemoryStore`]s, refusing the first `refusals` attempts
pub struct MemoryStoreConnector {
    state: SharedStore,
    refusals: usize,
    attempts: AtomicUsize,
}

impl MemoryStoreConnector {
    pub fn new(state: SharedStore) -> Self {
        Self::refusing(state, 0)
    }

    pub fn refusing(state: SharedStore, refusals: usize) -> Self {
        Self {
            state,
            refusals,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryStoreConnector {
    type Connection = MemoryStore;

    fn target(&self) -> &str {
        "memory-db"
    }

    async fn connect(&self) -> SyncResult<MemoryStore> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.refusals {
            return Err(connection_error("memory-db"));
        }
        let mut store = MemoryStore::new(Arc::clone(&self.state));
        store.ensure_schema().await?;
        Ok(store)
    }
}

/// State behind every [`MemoryQueue`] opened by one connector
#[derive(Debug, Default)]
pub struct QueueState {
    pub items: VecDeque<String>,
    pub dead_letters: HashMap<String, Vec<String>>,
    pub pops: usize,
    pub drop_next: bool,
}

pub type SharedQueue = Arc<Mutex<QueueState>>;

pub fn shared_queue<I, S>(items: I) -> SharedQueue
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Arc::new(Mutex::new(QueueState {
        items: items.into_iter().map(Into::into).collect(),
        ..QueueState::default()
    }))
}

pub struct MemoryQueue {
    state: SharedQueue,
}

#[async_trait]
impl NeighborQueue for MemoryQueue {
    fn name(&self) -> &str {
        "cosine_neighbors"
    }

    async fn pop(&mut self) -> SyncResult<Option<String>> {
        let mut state = self.state.lock().unwrap();
        if state.drop_next {
            state.drop_next = false;
            return Err(connection_error("memory-redis"));
        }
        state.pops += 1;
        Ok(state.items.pop_front())
    }

    async fn dead_letter(&mut self, queue: &str, payload: &str) -> SyncResult<()> {
        self.state
            .lock()
            .unwrap()
            .dead_letters
            .entry(queue.to_string())
            .or_default()
            .push(payload.to_string());
        Ok(())
    }
}

pub struct MemoryQueueConnector {
    state: SharedQueue,
    attempts: AtomicUsize,
}

impl MemoryQueueConnector {
    pub fn new(state: SharedQueue) -> Self {
        Self {
            state,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryQueueConnector {
    type Connection = MemoryQueue;

    fn target(&self) -> &str {
        "memory-redis"
    }

    async fn connect(&self) -> SyncResult<MemoryQueue> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryQueue {
            state: Arc::clone(&self.state),
        })
    }
}

/// Payload in the producer's format: `neighbors` as a JSON-encoded string
pub fn payload(user_id: i32, neighbors: &[i32]) -> String {
    let encoded = serde_json::to_string(neighbors).unwrap();
    serde_json::json!({ "user_id": user_id, "neighbors": encoded }).to_string()
}
