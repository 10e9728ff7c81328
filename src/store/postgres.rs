// Copyright (c) 2025 - Cowboy AI, Inc.

//! PostgreSQL-backed edge store
//!
//! Each loop owns exactly one `PgConnection`; there is no pool. A dead
//! connection is replaced through the owning
//! [`ConnectionHandle`](crate::lifecycle::ConnectionHandle).

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::debug;

use super::EdgeStore;
use crate::config::PostgresConfig;
use crate::errors::{SyncError, SyncResult};
use crate::lifecycle::Connector;
use crate::model::NeighborEdge;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS neighbors (
        user_id INTEGER NOT NULL,
        neighbor_id INTEGER NOT NULL,
        UNIQUE (user_id, neighbor_id)
    )
"#;

/// Edge store over a single PostgreSQL connection
pub struct PgEdgeStore {
    connection: PgConnection,
}

impl PgEdgeStore {
    pub fn new(connection: PgConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl EdgeStore for PgEdgeStore {
    async fn ensure_schema(&mut self) -> SyncResult<()> {
        sqlx::query(CREATE_TABLE).execute(&mut self.connection).await?;
        debug!("Ensured neighbors table exists");
        Ok(())
    }

    async fn count_edges(&mut self, user_id: i32) -> SyncResult<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM neighbors WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&mut self.connection)
                .await?;
        Ok(count)
    }

    async fn insert_edge(&mut self, edge: NeighborEdge) -> SyncResult<()> {
        sqlx::query("INSERT INTO neighbors (user_id, neighbor_id) VALUES ($1, $2)")
            .bind(edge.user_id)
            .bind(edge.neighbor_id)
            .execute(&mut self.connection)
            .await?;
        Ok(())
    }

    async fn all_edges(&mut self) -> SyncResult<Vec<NeighborEdge>> {
        let rows = sqlx::query_as::<_, NeighborEdge>("SELECT user_id, neighbor_id FROM neighbors")
            .fetch_all(&mut self.connection)
            .await?;
        Ok(rows)
    }

    async fn keep_alive(&mut self) -> SyncResult<()> {
        sqlx::query("SELECT 1").execute(&mut self.connection).await?;
        Ok(())
    }
}

/// Opens [`PgEdgeStore`]s and ensures the schema on every acquisition
#[derive(Debug, Clone)]
pub struct PostgresConnector {
    options: PgConnectOptions,
    label: String,
}

impl PostgresConnector {
    pub fn new(config: &PostgresConfig) -> Self {
        Self {
            options: config.options.clone(),
            label: format!("db ({})", config.describe()),
        }
    }
}

#[async_trait]
impl Connector for PostgresConnector {
    type Connection = PgEdgeStore;

    fn target(&self) -> &str {
        &self.label
    }

    async fn connect(&self) -> SyncResult<PgEdgeStore> {
        let connection = PgConnection::connect_with(&self.options)
            .await
            .map_err(|e| startup_error(e.into()))?;

        let mut store = PgEdgeStore::new(connection);
        store.ensure_schema().await.map_err(startup_error)?;
        Ok(store)
    }
}

/// Startup-phase errors other than configuration count as connection
/// failures. This covers the catalog unique violation raised when two
/// sessions race on `CREATE TABLE IF NOT EXISTS`.
fn startup_error(err: SyncError) -> SyncError {
    match err {
        SyncError::Configuration(_) | SyncError::Connection { .. } => err,
        other => SyncError::connection("postgres", other),
    }
}
