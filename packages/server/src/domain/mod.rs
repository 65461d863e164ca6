//! Domain layer: entities, value objects and the interfaces the use cases depend on.

pub mod entity;
pub mod error;
pub mod event;
pub mod presence;
pub mod pusher;
pub mod repository;
pub mod room;
pub mod session;
pub mod unseen;
pub mod value_object;

pub use entity::{Conversation, ConversationKey, Message};
pub use error::{MessagePushError, RepositoryError, SessionError, ValueObjectError};
pub use event::{ErrorCode, ServerEvent};
pub use presence::{PresenceChange, PresenceTracker};
pub use pusher::{MessagePusher, PusherChannel};
pub use repository::{ConversationRepository, UserDirectory};
#[cfg(test)]
pub use repository::MockConversationRepository;
pub use room::{ROOM_ID_SEPARATOR, RoomId, RoomMembership};
pub use session::{Session, SessionState};
pub use unseen::{UnseenCounts, unseen_counts};
pub use value_object::{ConnectionId, DisplayName, MessageText, Timestamp, UserId};
