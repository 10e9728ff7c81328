// Copyright (c) 2025 - Cowboy AI, Inc.

//! WebSocket frame types

use serde::{Deserialize, Serialize};

use crate::model::NeighborSnapshot;

/// Greeting sent once to every new connection
pub const GREETING: &str = "Welcome!";

/// Frames sent from the server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Free-form text, used for the greeting
    Message { text: String },

    /// Current state of the neighbor table
    Neighbors { neighbors: NeighborSnapshot },

    /// Reply to a client ping
    Pong,

    /// The client fell behind and missed this many broadcasts
    Lagged { missed: u64 },
}

impl ServerMessage {
    pub fn greeting() -> Self {
        ServerMessage::Message {
            text: GREETING.to_string(),
        }
    }
}

/// Frames accepted from clients
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join a named channel
    Subscribe { channel: String },

    /// Heartbeat
    Ping,
}
