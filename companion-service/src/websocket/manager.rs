//! WebSocket connection manager.
//!
//! Tracks every open connection together with the companion session it
//! hosts.

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::service::CompanionSession;

use super::messages::ServerMessage;

/// State for a single WebSocket connection
pub(crate) struct ConnectionState {
    pub(crate) tx: mpsc::UnboundedSender<ServerMessage>,
    pub(crate) session: CompanionSession,
}

/// Manager for all WebSocket connections
pub struct WebSocketManager {
    pub(crate) connections: DashMap<String, ConnectionState>,
}

impl Default for WebSocketManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WebSocketManager {
    /// Create a new WebSocket manager
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Add a new connection
    pub(crate) fn add_connection(
        &self,
        session_id: String,
        tx: mpsc::UnboundedSender<ServerMessage>,
        session: CompanionSession,
    ) {
        debug!(session_id = %session_id, "Adding WebSocket connection");
        self.connections
            .insert(session_id, ConnectionState { tx, session });
    }

    /// Remove a connection and close its companion session
    pub(crate) fn remove_connection(&self, session_id: &str) {
        debug!(session_id = %session_id, "Removing WebSocket connection");
        if let Some((_, conn)) = self.connections.remove(session_id) {
            conn.session.close();
        }
    }

    /// Send a message to a specific connection
    pub fn send_to(&self, session_id: &str, msg: ServerMessage) {
        if let Some(conn) = self.connections.get(session_id)
            && conn.tx.send(msg).is_err()
        {
            warn!(session_id = %session_id, "Failed to send message to connection");
        }
    }

    /// Get the number of active connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Close every session, e.g. on shutdown
    pub fn close_all(&self) {
        for entry in self.connections.iter() {
            entry.value().session.close();
        }
        self.connections.clear();
    }
}
