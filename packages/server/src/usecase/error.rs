//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{RepositoryError, ServerEvent, SessionError, ValueObjectError};

/// JoinChat のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinChatError {
    #[error(transparent)]
    Validation(#[from] ValueObjectError),

    #[error(transparent)]
    Protocol(#[from] SessionError),
}

/// SendMessage のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error(transparent)]
    Validation(#[from] ValueObjectError),

    #[error(transparent)]
    Protocol(#[from] SessionError),

    #[error("failed to persist message: {0}")]
    Persistence(#[from] RepositoryError),
}

/// MarkAsSeen のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkAsSeenError {
    #[error(transparent)]
    Validation(#[from] ValueObjectError),

    #[error(transparent)]
    Protocol(#[from] SessionError),

    #[error("failed to mark messages as seen: {0}")]
    Persistence(#[from] RepositoryError),
}

/// 送信元の接続に返すエラーイベント
///
/// バリデーションエラーとプロトコルエラーは送信元に通知する。
/// 永続化エラーはログに残すのみで、クライアントには何も返さない。
pub trait Rejection {
    fn rejection(&self) -> Option<ServerEvent>;
}

impl Rejection for JoinChatError {
    fn rejection(&self) -> Option<ServerEvent> {
        match self {
            JoinChatError::Validation(e) => Some(e.into()),
            JoinChatError::Protocol(e) => Some(e.into()),
        }
    }
}

impl Rejection for SendMessageError {
    fn rejection(&self) -> Option<ServerEvent> {
        match self {
            SendMessageError::Validation(e) => Some(e.into()),
            SendMessageError::Protocol(e) => Some(e.into()),
            SendMessageError::Persistence(_) => None,
        }
    }
}

impl Rejection for MarkAsSeenError {
    fn rejection(&self) -> Option<ServerEvent> {
        match self {
            MarkAsSeenError::Validation(e) => Some(e.into()),
            MarkAsSeenError::Protocol(e) => Some(e.into()),
            MarkAsSeenError::Persistence(_) => None,
        }
    }
}
