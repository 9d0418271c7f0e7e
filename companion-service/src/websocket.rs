//! WebSocket surface for companion sessions
//!
//! Every connection hosts one companion session. Clients send typed text and
//! speech-capture events; the server streams transcript messages, render
//! frames and speech commands back.

mod handlers;
mod manager;
pub mod messages;

pub use handlers::handle_ws_connection;
pub use manager::WebSocketManager;
