//! WebSocket message types.
//!
//! Defines the client-to-server and server-to-client message formats
//! for WebSocket communication.

use serde::{Deserialize, Serialize};

use crate::service::{ChatMessage, ConversationSnapshot, Frame, SessionEvent};
use crate::speech::SpeechCommand;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Report host capabilities
    Hello {
        #[serde(default)]
        speech_supported: bool,
    },
    /// Keepalive ping
    Ping,
    /// Typed text from the input field
    Submit { text: String },
    /// Mic button pressed
    MicToggle,
    /// Best transcript so far from the host recognizer
    SpeechResult { text: String },
    /// Speech capture ended
    SpeechEnd,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once when the connection opens, with the state the session
    /// starts from
    Welcome {
        session_id: String,
        snapshot: Box<ConversationSnapshot>,
    },
    /// Keepalive pong response
    Pong { timestamp: u64 },
    /// Error message
    Error {
        code: String,
        message: String,
        recoverable: bool,
    },
    /// Transcript message appended
    Message { message: ChatMessage },
    /// Figure changed
    Frame { frame: Box<Frame> },
    /// Interim speech transcript, for the input field
    Transcript { text: String },
    /// Start or stop host speech capture
    Speech { command: SpeechCommand },
}

impl From<SessionEvent> for ServerMessage {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::Message { message } => ServerMessage::Message { message },
            SessionEvent::Frame { frame } => ServerMessage::Frame {
                frame: Box::new(frame),
            },
            SessionEvent::Transcript { text } => ServerMessage::Transcript { text },
            SessionEvent::Speech { command } => ServerMessage::Speech { command },
        }
    }
}
