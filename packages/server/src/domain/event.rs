//! サーバーからクライアントへ通知するイベント
//!
//! ワイヤーフォーマットへの変換は Infrastructure 層（DTO）が担当する。

use super::{
    entity::Message,
    error::{SessionError, ValueObjectError},
    unseen::UnseenCounts,
    value_object::{DisplayName, UserId},
};

/// 送信元の接続にのみ返すエラーの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// JSON として解釈できない、または未知のイベント
    InvalidPayload,
    /// フィールドの値が不正（空のメッセージなど）
    Validation,
    /// join-chat 前の操作
    NotIdentified,
    /// セッションのユーザーと異なるユーザーとしての操作
    IdentityMismatch,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidPayload => "invalid-payload",
            ErrorCode::Validation => "validation",
            ErrorCode::NotIdentified => "not-identified",
            ErrorCode::IdentityMismatch => "identity-mismatch",
        }
    }
}

/// サーバーイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// 接続直後に送るオンラインユーザー一覧
    OnlineUsersSnapshot { user_ids: Vec<UserId> },
    UserOnline { user_id: UserId },
    UserOffline { user_id: UserId },
    /// ルームに配信されるチャットメッセージ
    MessageReceived {
        sender_name: DisplayName,
        message: Message,
    },
    /// 会話相手ごとの未読数
    UnseenCounts { counts: UnseenCounts },
    Error { code: ErrorCode, message: String },
}

impl ServerEvent {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerEvent::Error {
            code,
            message: message.into(),
        }
    }
}

impl From<&ValueObjectError> for ServerEvent {
    fn from(error: &ValueObjectError) -> Self {
        ServerEvent::error(ErrorCode::Validation, error.to_string())
    }
}

impl From<&SessionError> for ServerEvent {
    fn from(error: &SessionError) -> Self {
        let code = match error {
            SessionError::NotIdentified | SessionError::Disconnected => ErrorCode::NotIdentified,
            SessionError::IdentityMismatch { .. } => ErrorCode::IdentityMismatch,
        };
        ServerEvent::error(code, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_to_event() {
        // テスト項目: プロトコルエラーが対応するエラーコードのイベントに変換される
        let not_identified = ServerEvent::from(&SessionError::NotIdentified);
        let mismatch = ServerEvent::from(&SessionError::IdentityMismatch {
            current: "alice".to_string(),
            requested: "bob".to_string(),
        });

        assert!(matches!(
            not_identified,
            ServerEvent::Error {
                code: ErrorCode::NotIdentified,
                ..
            }
        ));
        assert!(matches!(
            mismatch,
            ServerEvent::Error {
                code: ErrorCode::IdentityMismatch,
                ..
            }
        ));
    }

    #[test]
    fn test_validation_error_to_event() {
        // テスト項目: バリデーションエラーが validation コードのイベントに変換される
        let event = ServerEvent::from(&ValueObjectError::EmptyMessageText);

        assert_eq!(
            event,
            ServerEvent::error(ErrorCode::Validation, "message text must not be empty")
        );
    }

    #[test]
    fn test_error_code_as_str() {
        // テスト項目: エラーコードがケバブケースの文字列になる
        assert_eq!(ErrorCode::InvalidPayload.as_str(), "invalid-payload");
        assert_eq!(ErrorCode::NotIdentified.as_str(), "not-identified");
    }
}
