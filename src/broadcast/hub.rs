// Copyright (c) 2025 - Cowboy AI, Inc.

//! Subscription hub
//!
//! Holds the broadcast channel every session listens on and the channel
//! membership of each connected client. Membership is additive: a client
//! stays in every channel it joined until it disconnects.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::messages::ServerMessage;

/// Channel every client belongs to from the moment it connects
pub const DEFAULT_CHANNEL: &str = "neighbors";

/// Identifier of one WebSocket connection
pub type ClientId = Uuid;

/// Shared registry of connected clients
pub struct SubscriptionHub {
    tx: broadcast::Sender<ServerMessage>,
    memberships: Mutex<HashMap<String, HashSet<ClientId>>>,
    published: AtomicU64,
}

impl SubscriptionHub {
    /// Create a hub whose slowest client may lag `capacity` messages
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            memberships: Mutex::new(HashMap::new()),
            published: AtomicU64::new(0),
        }
    }

    fn memberships(&self) -> MutexGuard<'_, HashMap<String, HashSet<ClientId>>> {
        self.memberships
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new client on the default channel
    pub fn connect(&self) -> (ClientId, broadcast::Receiver<ServerMessage>) {
        let client = Uuid::now_v7();
        let rx = self.tx.subscribe();
        self.join(client, DEFAULT_CHANNEL);
        (client, rx)
    }

    /// Add `client` to `channel`. Returns `false` if it was already a member.
    pub fn join(&self, client: ClientId, channel: &str) -> bool {
        self.memberships()
            .entry(channel.to_string())
            .or_default()
            .insert(client)
    }

    /// Remove `client` from every channel
    pub fn disconnect(&self, client: ClientId) {
        let mut memberships = self.memberships();
        memberships.retain(|_, members| {
            members.remove(&client);
            !members.is_empty()
        });
    }

    /// Clients that joined `channel`
    pub fn members(&self, channel: &str) -> HashSet<ClientId> {
        self.memberships()
            .get(channel)
            .cloned()
            .unwrap_or_default()
    }

    /// Channels `client` has joined, sorted by name
    pub fn channels_of(&self, client: ClientId) -> BTreeSet<String> {
        self.memberships()
            .iter()
            .filter(|(_, members)| members.contains(&client))
            .map(|(channel, _)| channel.clone())
            .collect()
    }

    /// Send `message` to every connected client.
    ///
    /// Returns how many clients it was queued for.
    pub fn publish(&self, message: ServerMessage) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);
        // An error only means nobody is connected.
        self.tx.send(message).unwrap_or(0)
    }

    /// Number of live receivers
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Number of messages published since startup
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for SubscriptionHub {
    fn default() -> Self {
        Self::new(64)
    }
}
