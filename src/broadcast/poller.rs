// Copyright (c) 2025 - Cowboy AI, Inc.

//! Store-polling snapshot publisher

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use super::hub::SubscriptionHub;
use super::messages::ServerMessage;
use crate::errors::SyncResult;
use crate::lifecycle::{ConnectionHandle, Connector};
use crate::model::NeighborSnapshot;
use crate::store::EdgeStore;

/// Reads the whole edge table on a fixed interval and publishes it.
///
/// No state is carried between ticks; each snapshot is rebuilt from scratch.
pub struct SnapshotPoller<C: Connector> {
    store: ConnectionHandle<C>,
    hub: Arc<SubscriptionHub>,
    interval: Duration,
}

impl<C> SnapshotPoller<C>
where
    C: Connector,
    C::Connection: EdgeStore,
{
    pub fn new(store: ConnectionHandle<C>, hub: Arc<SubscriptionHub>, interval: Duration) -> Self {
        Self {
            store,
            hub,
            interval,
        }
    }

    pub fn store_handle(&self) -> &ConnectionHandle<C> {
        &self.store
    }

    /// Publish forever, pausing `interval` after every tick
    pub async fn run(&mut self) -> SyncResult<()> {
        info!(interval_ms = self.interval.as_millis() as u64, "Starting snapshot poller");
        loop {
            self.tick().await?;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Query, group and publish once.
    ///
    /// A failed query is logged and yields `Ok(None)`; the next tick retries.
    pub async fn tick(&mut self) -> SyncResult<Option<NeighborSnapshot>> {
        self.store.reconnect_if_needed().await?;

        let edges = self.store.connection().all_edges().await;
        self.store.observe(&edges);

        let edges = match edges {
            Ok(edges) => edges,
            Err(e) => {
                error!(error = %e, "Error performing query");
                return Ok(None);
            }
        };

        let snapshot = NeighborSnapshot::from_edges(edges);
        let delivered = self.hub.publish(ServerMessage::Neighbors {
            neighbors: snapshot.clone(),
        });

        debug!(
            users = snapshot.user_count(),
            edges = snapshot.edge_count(),
            delivered,
            neighbors = ?snapshot.as_map(),
            "Published neighbors snapshot"
        );
        Ok(Some(snapshot))
    }
}
