//! Realtime chat and presence server library.
//!
//! This library provides a WebSocket-based one-to-one chat server with
//! online-presence tracking and per-conversation unseen-message counters.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
