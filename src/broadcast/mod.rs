// Copyright (c) 2025 - Cowboy AI, Inc.

//! Broadcast service
//!
//! Republishes the neighbor table to WebSocket clients:
//!
//! - [`poller`]: reads every edge once per interval and publishes a snapshot
//! - [`hub`]: client registry, channel membership and the broadcast channel
//! - [`socket`]: per-connection WebSocket session
//! - [`http`]: router serving `/ws`, `/health` and static assets
//! - [`messages`]: JSON frames exchanged with clients
//!
//! Snapshots go to every connected client. Channel subscriptions are recorded
//! but do not narrow delivery.

pub mod http;
pub mod hub;
pub mod messages;
pub mod poller;
pub mod socket;

pub use http::create_router;
pub use hub::{ClientId, SubscriptionHub, DEFAULT_CHANNEL};
pub use messages::{ClientMessage, ServerMessage};
pub use poller::SnapshotPoller;
