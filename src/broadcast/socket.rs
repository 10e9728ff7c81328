// Copyright (c) 2025 - Cowboy AI, Inc.

//! WebSocket session handling

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use super::hub::{ClientId, SubscriptionHub};
use super::messages::{ClientMessage, ServerMessage};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<Arc<SubscriptionHub>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: Arc<SubscriptionHub>) {
    let (client, mut rx) = hub.connect();
    let (mut sender, mut receiver) = socket.split();
    info!(%client, "Client connected");

    if send(&mut sender, &ServerMessage::greeting()).await {
        loop {
            tokio::select! {
                result = rx.recv() => {
                    let outgoing = match result {
                        Ok(message) => message,
                        Err(RecvError::Lagged(missed)) => ServerMessage::Lagged { missed },
                        Err(RecvError::Closed) => break,
                    };
                    if !send(&mut sender, &outgoing).await {
                        break;
                    }
                }

                result = receiver.next() => {
                    match result {
                        Some(Ok(Message::Text(text))) => {
                            if let Some(reply) = handle_client_text(&hub, client, &text) {
                                if !send(&mut sender, &reply).await {
                                    break;
                                }
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if sender.send(Message::Pong(data)).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        Some(Ok(_)) => {}
                    }
                }
            }
        }
    }

    hub.disconnect(client);
    info!(%client, "Client disconnected");
}

/// Serialize and send one frame. Returns `false` once the client is gone.
async fn send(sender: &mut SplitSink<WebSocket, Message>, message: &ServerMessage) -> bool {
    match serde_json::to_string(message) {
        Ok(json) => sender.send(Message::Text(json)).await.is_ok(),
        Err(e) => {
            debug!(error = %e, "Failed to serialize frame");
            true
        }
    }
}

/// Apply one text frame from `client`, returning the reply to send, if any.
///
/// Frames that do not parse are ignored.
pub fn handle_client_text(
    hub: &SubscriptionHub,
    client: ClientId,
    text: &str,
) -> Option<ServerMessage> {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Subscribe { channel }) => {
            if hub.join(client, &channel) {
                debug!(%client, channel = %channel, "Client subscribed");
            }
            None
        }
        Ok(ClientMessage::Ping) => Some(ServerMessage::Pong),
        Err(e) => {
            debug!(%client, error = %e, "Ignoring unrecognized frame");
            None
        }
    }
}
