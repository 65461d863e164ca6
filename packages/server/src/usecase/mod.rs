//! UseCase layer: one use case per protocol operation.
//!
//! 各ユースケースはドメイン層の trait にのみ依存し、UI 層（WebSocket / HTTP ハンドラ）から呼ばれる。

pub mod connect_session;
pub mod disconnect_session;
pub mod error;
pub mod get_presence;
pub mod get_unseen_counts;
pub mod join_chat;
pub mod keyed_lock;
pub mod mark_as_seen;
pub mod send_message;
pub mod unseen_notifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::{DisconnectOutcome, DisconnectSessionUseCase};
pub use error::{JoinChatError, MarkAsSeenError, Rejection, SendMessageError};
pub use get_presence::GetPresenceUseCase;
pub use get_unseen_counts::GetUnseenCountsUseCase;
pub use join_chat::{JoinChatCommand, JoinChatOutcome, JoinChatUseCase};
pub use keyed_lock::{ConversationLocks, KeyedLocks, PresenceLocks};
pub use mark_as_seen::{MarkAsSeenCommand, MarkAsSeenUseCase};
pub use send_message::{SendMessageCommand, SendMessageUseCase};
pub use unseen_notifier::UnseenCountsNotifier;
