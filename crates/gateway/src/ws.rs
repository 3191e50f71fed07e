//! axum WebSocket handler: handshake admission, ready transition, frame
//! loop, close.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::engine::ConversationEngine;
use crate::gate::ConnectionGate;
use crate::wire::{OutboundMessage, ReadyPayload};

/// Shared state for the WebSocket route.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<ConnectionGate>,
    pub engine: Arc<ConversationEngine>,
    pub ready: ReadyPayload,
}

/// Handshake entry point. A second simultaneous client is refused here and
/// never upgrades.
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    if !state.gate.try_admit() {
        return (StatusCode::SERVICE_UNAVAILABLE, "another session is active").into_response();
    }
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let handle = state.gate.next_handle();

    // Ready transition: occupy the gate, start a fresh session, greet.
    state.gate.activate(handle);
    state.engine.reset_session().await;
    info!(handle, "Connection ready, session history cleared");

    let hello = OutboundMessage::ServerReady(state.ready.clone());
    if send_json(&mut socket, &hello).await.is_err() {
        warn!(handle, "Failed to send ready message");
        state.gate.release(handle);
        return;
    }

    while let Some(result) = socket.recv().await {
        let message = match result {
            Ok(message) => message,
            Err(e) => {
                warn!(handle, error = %e, "WebSocket receive error");
                break;
            }
        };

        match message {
            Message::Text(text) => {
                if !state.gate.is_active(handle) {
                    break;
                }
                if let Some(reply) = state.engine.handle_frame(&text).await {
                    if send_json(&mut socket, &reply).await.is_err() {
                        warn!(handle, "Failed to send reply");
                        break;
                    }
                }
            }
            Message::Binary(_) => {
                debug!(handle, "Ignoring non-text frame");
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => break,
        }
    }

    info!(handle, "WebSocket connection closing");
    state.gate.release(handle);
}

async fn send_json<T: Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), axum::Error> {
    let json = serde_json::to_string(value).expect("outbound messages serialize");
    debug!(preview = %json.chars().take(200).collect::<String>(), "Sending WebSocket data");
    socket.send(Message::Text(json)).await
}
