//! WebSocket message handlers.
//!
//! Contains the logic for handling incoming WebSocket connections
//! and processing client messages.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::CompanionConfig;
use crate::error::ServiceError;
use crate::service::{CompanionSession, SessionEvent};

use super::manager::WebSocketManager;
use super::messages::{ClientMessage, ServerMessage};

/// Handle a WebSocket connection
///
/// Starts a companion session for the connection, forwards its events to
/// the socket and feeds client messages into it until the socket closes.
pub async fn handle_ws_connection(
    socket: WebSocket,
    ws_manager: Arc<WebSocketManager>,
    catalog: Arc<Catalog>,
    config: Arc<CompanionConfig>,
) {
    // Session events become server messages on the connection channel
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<SessionEvent>();
    let session = CompanionSession::start(Uuid::new_v4(), catalog, config, event_tx);
    let session_id = session.id().to_string();
    info!(session_id = %session_id, "New WebSocket connection");

    // Split the socket into sender and receiver
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Create a channel for sending messages to this connection
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Welcome goes out before any buffered session event
    let welcome = ServerMessage::Welcome {
        session_id: session_id.clone(),
        snapshot: Box::new(session.snapshot().await),
    };
    let _ = msg_tx.send(welcome);

    let events_out = msg_tx.clone();
    let event_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if events_out.send(event.into()).is_err() {
                break;
            }
        }
    });

    ws_manager.add_connection(session_id.clone(), msg_tx, session.clone());

    // Spawn task to forward messages from channel to WebSocket
    let session_id_clone = session_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_tx.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let error = ServiceError::from(e);
                    error!(
                        session_id = %session_id_clone,
                        code = error.error_code(),
                        error = %error,
                        "Failed to serialize WebSocket message"
                    );
                }
            }
        }
        debug!(session_id = %session_id_clone, "WebSocket send task ended");
    });

    // Process incoming messages
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                handle_client_message(&session_id, &text, &ws_manager, &session).await;
            }
            Ok(Message::Binary(data)) => {
                handle_binary_message(&session_id, &data, &ws_manager, &session).await;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // axum answers pings itself
            }
            Ok(Message::Close(_)) => {
                info!(session_id = %session_id, "WebSocket connection closed by client");
                break;
            }
            Err(e) => {
                error!(session_id = %session_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Clean up
    ws_manager.remove_connection(&session_id);
    event_task.abort();
    send_task.abort();
    info!(session_id = %session_id, "WebSocket connection closed");
}

/// Binary frames carry the same JSON as text frames
pub(crate) async fn handle_binary_message(
    session_id: &str,
    data: &[u8],
    ws_manager: &WebSocketManager,
    session: &CompanionSession,
) {
    match std::str::from_utf8(data) {
        Ok(text) => handle_client_message(session_id, text, ws_manager, session).await,
        Err(e) => {
            warn!(
                session_id = %session_id,
                error = %e,
                len = data.len(),
                "Binary client message is not UTF-8"
            );
            send_invalid(
                ws_manager,
                session_id,
                format!("Binary message is not valid UTF-8: {}", e),
            );
        }
    }
}

/// Parse one client message and apply it to the session
pub(crate) async fn handle_client_message(
    session_id: &str,
    text: &str,
    ws_manager: &WebSocketManager,
    session: &CompanionSession,
) {
    let msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(
                session_id = %session_id,
                error = %e,
                text = %text,
                "Failed to parse client message"
            );
            send_invalid(
                ws_manager,
                session_id,
                format!("Failed to parse message: {}", e),
            );
            return;
        }
    };

    match msg {
        ClientMessage::Hello { speech_supported } => {
            session.set_speech_supported(speech_supported).await;
        }
        ClientMessage::Ping => {
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0);
            ws_manager.send_to(session_id, ServerMessage::Pong { timestamp });
        }
        ClientMessage::Submit { text } => {
            if !session.submit(&text).await {
                debug!(session_id = %session_id, "Ignored blank submission");
            }
        }
        ClientMessage::MicToggle => {
            session.toggle_mic().await;
        }
        ClientMessage::SpeechResult { text } => {
            session.speech_result(&text).await;
        }
        ClientMessage::SpeechEnd => {
            session.speech_end().await;
        }
    }
}

/// Answer unusable client input with a recoverable error
fn send_invalid(ws_manager: &WebSocketManager, session_id: &str, message: String) {
    let error = ServiceError::InvalidMessage { message };
    ws_manager.send_to(
        session_id,
        ServerMessage::Error {
            code: error.error_code().to_string(),
            message: error.to_string(),
            recoverable: error.is_recoverable(),
        },
    );
}
