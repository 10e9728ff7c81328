// Copyright (c) 2025 - Cowboy AI, Inc.

//! Error types for synchronization operations

use thiserror::Error;

/// Errors that can occur while moving neighbor data between the stores
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network, socket or protocol failure talking to either store
    #[error("Connection error ({target}): {message}")]
    Connection {
        /// Store the connection was meant for
        target: String,
        /// Underlying failure
        message: String,
    },

    /// Non-connection failure of a queue command
    #[error("Queue error: {0}")]
    Queue(String),

    /// A single edge row collided with an existing one
    #[error("Unique violation: {0}")]
    UniqueViolation(String),

    /// Any other relational store failure
    #[error("Database error: {0}")]
    Database(String),

    /// Malformed message payload
    #[error("Decode error: {0}")]
    Decode(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Startup configuration is unusable
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for synchronization operations
pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    pub(crate) fn connection(target: impl Into<String>, message: impl ToString) -> Self {
        SyncError::Connection {
            target: target.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error means the connection that produced it is no longer usable
    pub fn is_connection(&self) -> bool {
        matches!(self, SyncError::Connection { .. })
    }
}

impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                SyncError::UniqueViolation(db.message().to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => SyncError::connection("postgres", &err),
            sqlx::Error::Configuration(_) => SyncError::Configuration(err.to_string()),
            _ => SyncError::Database(err.to_string()),
        }
    }
}

impl From<redis::RedisError> for SyncError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_dropped()
            || err.is_connection_refusal()
            || err.is_timeout()
        {
            SyncError::connection("redis", err)
        } else {
            SyncError::Queue(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}
