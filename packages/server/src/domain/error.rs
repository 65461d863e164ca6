//! ドメイン層のエラー定義

use thiserror::Error;

/// 値オブジェクトの生成時に発生するバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("user id must be at most {max} characters (got {actual})")]
    UserIdTooLong { max: usize, actual: usize },

    #[error("user id must not contain the room separator '{0}'")]
    UserIdContainsSeparator(char),

    #[error("message text must not be empty")]
    EmptyMessageText,

    #[error("message text must be at most {max} characters (got {actual})")]
    MessageTextTooLong { max: usize, actual: usize },

    #[error("a conversation needs two distinct participants (got '{0}' twice)")]
    SameParticipants(String),
}

/// Repository 操作のエラー
///
/// 永続化層の失敗は全て回復可能なエラーとして呼び出し元に返される。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("conversation '{0}' not found")]
    ConversationNotFound(String),

    #[error("conversation '{0}' already exists")]
    ConversationAlreadyExists(String),

    #[error("user '{user_id}' is not a participant of conversation '{conversation}'")]
    NotAParticipant {
        user_id: String,
        conversation: String,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// MessagePusher 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),

    #[error("failed to encode event: {0}")]
    EncodeFailed(String),
}

/// セッションの状態遷移に関するプロトコルエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("connection has not joined a chat yet")]
    NotIdentified,

    #[error("connection is already identified as '{current}', not '{requested}'")]
    IdentityMismatch { current: String, requested: String },

    #[error("connection is disconnected")]
    Disconnected,
}
