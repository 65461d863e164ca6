//! インメモリ Repository 実装

pub mod conversation;
pub mod user;

pub use conversation::InMemoryConversationRepository;
pub use user::InMemoryUserDirectory;
