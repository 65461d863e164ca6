//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::{get_presence, get_unseen_counts, health_check};
pub use websocket::websocket_handler;
