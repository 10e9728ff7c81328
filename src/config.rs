// Copyright (c) 2025 - Cowboy AI, Inc.

//! Environment-driven configuration for the worker and broadcaster binaries

use sqlx::postgres::PgConnectOptions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{SyncError, SyncResult};

pub const DEFAULT_DATABASE_URL: &str = "postgres://postgres:postgres@db/postgres";
pub const DEFAULT_REDIS_HOST: &str = "redis";
pub const DEFAULT_REDIS_PORT: u16 = 6379;
pub const DEFAULT_QUEUE: &str = "cosine_neighbors";
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_STATIC_DIR: &str = "views";

/// Reconnect pacing shared by both store connectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Fixed pause between connection attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
        }
    }
}

/// PostgreSQL connection settings
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub options: PgConnectOptions,
}

impl PostgresConfig {
    /// Parse a DSN up front so a malformed one aborts startup
    pub fn from_url(url: &str) -> SyncResult<Self> {
        if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
            return Err(SyncError::Configuration(
                "DATABASE_URL must use the postgres:// scheme".to_string(),
            ));
        }
        let options = PgConnectOptions::from_str(url)
            .map_err(|e| SyncError::Configuration(format!("invalid DATABASE_URL: {}", e)))?;
        Ok(Self { options })
    }

    /// Host and database name, without credentials
    pub fn describe(&self) -> String {
        format!(
            "{}:{}/{}",
            self.options.get_host(),
            self.options.get_port(),
            self.options.get_database().unwrap_or("postgres")
        )
    }
}

/// Redis connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_REDIS_HOST.to_string(),
            port: DEFAULT_REDIS_PORT,
        }
    }
}

/// Configuration for the `neighbor-worker` binary
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub postgres: PostgresConfig,
    pub redis: RedisConfig,
    /// List the drain loop pops from
    pub queue: String,
    /// Where undecodable payloads go; `None` drops them
    pub dead_letter_queue: Option<String>,
    /// Pause before every drain cycle
    pub drain_interval: Duration,
    pub retry: RetryPolicy,
}

impl WorkerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> SyncResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let postgres = PostgresConfig::from_url(&url)?;

        let redis = RedisConfig {
            host: lookup("REDIS_HOST").unwrap_or_else(|| DEFAULT_REDIS_HOST.to_string()),
            port: parse_or(&lookup, "REDIS_PORT", DEFAULT_REDIS_PORT)?,
        };

        let queue = lookup("NEIGHBOR_QUEUE").unwrap_or_else(|| DEFAULT_QUEUE.to_string());
        let dead_letter_queue = lookup("NEIGHBOR_DEAD_LETTER_QUEUE").filter(|q| !q.is_empty());

        Ok(Self {
            postgres,
            redis,
            queue,
            dead_letter_queue,
            drain_interval: millis_or(&lookup, "DRAIN_INTERVAL_MS", 100)?,
            retry: RetryPolicy {
                delay: millis_or(&lookup, "RECONNECT_DELAY_MS", 1000)?,
            },
        })
    }
}

/// Configuration for the `neighbor-broadcaster` binary
#[derive(Debug, Clone)]
pub struct BroadcasterConfig {
    pub postgres: PostgresConfig,
    pub bind_addr: SocketAddr,
    /// Pause between snapshot publications
    pub broadcast_interval: Duration,
    /// Directory holding the index document and assets
    pub static_dir: PathBuf,
    pub retry: RetryPolicy,
}

impl BroadcasterConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> SyncResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let postgres = PostgresConfig::from_url(&url)?;

        let bind_addr = match lookup("BIND_ADDR") {
            Some(addr) => addr
                .parse()
                .map_err(|e| SyncError::Configuration(format!("BIND_ADDR {:?}: {}", addr, e)))?,
            None => {
                let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };

        Ok(Self {
            postgres,
            bind_addr,
            broadcast_interval: millis_or(&lookup, "BROADCAST_INTERVAL_MS", 1000)?,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            retry: RetryPolicy {
                delay: millis_or(&lookup, "RECONNECT_DELAY_MS", 1000)?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> SyncResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| SyncError::Configuration(format!("{} {:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}

fn millis_or<F>(lookup: &F, key: &str, default_ms: u64) -> SyncResult<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(lookup, key, default_ms).map(Duration::from_millis)
}
