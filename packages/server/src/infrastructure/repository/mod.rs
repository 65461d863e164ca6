//! Repository 実装
//!
//! - `inmemory`: HashMap をストレージとして使うインメモリ実装

pub mod inmemory;

pub use inmemory::{InMemoryConversationRepository, InMemoryUserDirectory};
