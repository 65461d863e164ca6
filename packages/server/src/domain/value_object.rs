//! 値オブジェクト定義
//!
//! 生成時にバリデーションを行い、不正な値がドメイン層に入り込まないようにする。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{error::ValueObjectError, room::ROOM_ID_SEPARATOR};

/// ユーザー ID の最大文字数
pub const USER_ID_MAX_LEN: usize = 128;

/// メッセージ本文の最大文字数
pub const MESSAGE_TEXT_MAX_LEN: usize = 4096;

/// ユーザー ID
///
/// ユーザー管理サブシステムが払い出す識別子。前後の空白は取り除かれる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyUserId);
        }
        let len = trimmed.chars().count();
        if len > USER_ID_MAX_LEN {
            return Err(ValueObjectError::UserIdTooLong {
                max: USER_ID_MAX_LEN,
                actual: len,
            });
        }
        if trimmed.contains(ROOM_ID_SEPARATOR) {
            return Err(ValueObjectError::UserIdContainsSeparator(ROOM_ID_SEPARATOR));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 接続 ID
///
/// WebSocket 接続ごとにサーバーが払い出す。同じユーザーが複数の接続を持つことができる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// メッセージ本文
///
/// 空白のみの本文は拒否される。本文そのものは送信された通りに保持する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyMessageText);
        }
        let len = value.chars().count();
        if len > MESSAGE_TEXT_MAX_LEN {
            return Err(ValueObjectError::MessageTextTooLong {
                max: MESSAGE_TEXT_MAX_LEN,
                actual: len,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageText {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 表示名（姓・名）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayName {
    pub first_name: String,
    pub last_name: String,
}

impl DisplayName {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// 姓・名の両方が空かどうか
    pub fn is_blank(&self) -> bool {
        self.first_name.trim().is_empty() && self.last_name.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_trims_surrounding_whitespace() {
        // テスト項目: ユーザー ID の前後の空白が取り除かれる
        // given (前提条件):
        let raw = "  alice  ".to_string();

        // when (操作):
        let user_id = UserId::new(raw).unwrap();

        // then (期待する結果):
        assert_eq!(user_id.as_str(), "alice");
    }

    #[test]
    fn test_user_id_rejects_empty_and_blank() {
        // テスト項目: 空文字・空白のみのユーザー ID は拒否される
        assert_eq!(UserId::new(String::new()), Err(ValueObjectError::EmptyUserId));
        assert_eq!(
            UserId::new("   ".to_string()),
            Err(ValueObjectError::EmptyUserId)
        );
    }

    #[test]
    fn test_user_id_rejects_separator() {
        // テスト項目: ルーム ID の区切り文字を含むユーザー ID は拒否される
        // given (前提条件):
        let raw = "ali$ce".to_string();

        // when (操作):
        let result = UserId::new(raw);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::UserIdContainsSeparator(ROOM_ID_SEPARATOR))
        );
    }

    #[test]
    fn test_user_id_rejects_too_long() {
        // テスト項目: 最大長を超えるユーザー ID は拒否される
        // given (前提条件):
        let raw = "a".repeat(USER_ID_MAX_LEN + 1);

        // when (操作):
        let result = UserId::new(raw);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::UserIdTooLong {
                max: USER_ID_MAX_LEN,
                actual: USER_ID_MAX_LEN + 1,
            })
        );
    }

    #[test]
    fn test_user_id_deserialize_validates() {
        // テスト項目: JSON からのデシリアライズ時にもバリデーションが行われる
        let ok: Result<UserId, _> = serde_json::from_str("\"bob\"");
        let ng: Result<UserId, _> = serde_json::from_str("\"\"");

        assert_eq!(ok.unwrap().as_str(), "bob");
        assert!(ng.is_err());
    }

    #[test]
    fn test_message_text_rejects_whitespace_only() {
        // テスト項目: 空白のみのメッセージ本文は拒否される
        assert_eq!(
            MessageText::new(" \n\t ".to_string()),
            Err(ValueObjectError::EmptyMessageText)
        );
    }

    #[test]
    fn test_message_text_keeps_original_text() {
        // テスト項目: 有効なメッセージ本文は送信された通りに保持される
        // given (前提条件):
        let raw = "  hello  ".to_string();

        // when (操作):
        let text = MessageText::new(raw).unwrap();

        // then (期待する結果):
        assert_eq!(text.as_str(), "  hello  ");
    }

    #[test]
    fn test_message_text_rejects_too_long() {
        // テスト項目: 最大長を超えるメッセージ本文は拒否される
        let result = MessageText::new("x".repeat(MESSAGE_TEXT_MAX_LEN + 1));

        assert!(matches!(
            result,
            Err(ValueObjectError::MessageTextTooLong { .. })
        ));
    }

    #[test]
    fn test_connection_ids_are_unique() {
        // テスト項目: 接続 ID は生成ごとに異なる
        assert_ne!(ConnectionId::generate(), ConnectionId::generate());
    }

    #[test]
    fn test_display_name_is_blank() {
        // テスト項目: 姓・名がともに空の場合のみ blank と判定される
        assert!(DisplayName::default().is_blank());
        assert!(DisplayName::new(" ", "").is_blank());
        assert!(!DisplayName::new("Alice", "").is_blank());
    }
}
