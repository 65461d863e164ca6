//! エンティティ定義
//!
//! - `Conversation`: 2 人のユーザー間の会話（メッセージ履歴）
//! - `Message`: 会話内の 1 件のメッセージ

use std::{collections::BTreeSet, fmt};

use super::{
    error::{RepositoryError, ValueObjectError},
    room::RoomId,
    value_object::{MessageText, Timestamp, UserId},
};

/// 会話のキー
///
/// 参加者 2 人を辞書順に並べた組。`(a, b)` と `(b, a)` は同じキーになる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationKey {
    first: UserId,
    second: UserId,
}

impl ConversationKey {
    pub fn new(a: UserId, b: UserId) -> Result<Self, ValueObjectError> {
        if a == b {
            return Err(ValueObjectError::SameParticipants(a.into_string()));
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { first, second })
    }

    pub fn participants(&self) -> [&UserId; 2] {
        [&self.first, &self.second]
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        &self.first == user_id || &self.second == user_id
    }

    /// `user_id` の会話相手を返す（参加者でなければ `None`）
    pub fn counterpart_of(&self, user_id: &UserId) -> Option<&UserId> {
        if &self.first == user_id {
            Some(&self.second)
        } else if &self.second == user_id {
            Some(&self.first)
        } else {
            None
        }
    }

    /// この会話のメッセージを配信するルームの ID
    pub fn room_id(&self) -> RoomId {
        RoomId::derive(&self.first, &self.second)
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}

/// メッセージ
///
/// 既読者集合（seen_by）の追加以外は不変。送信者は常に既読者に含まれる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender_id: UserId,
    pub text: MessageText,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub seen_by: BTreeSet<UserId>,
}

impl Message {
    pub fn new(sender_id: UserId, text: MessageText, created_at: Timestamp) -> Self {
        let seen_by = BTreeSet::from([sender_id.clone()]);
        Self {
            sender_id,
            text,
            created_at,
            updated_at: created_at,
            seen_by,
        }
    }

    pub fn is_seen_by(&self, user_id: &UserId) -> bool {
        self.seen_by.contains(user_id)
    }
}

/// 会話
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub key: ConversationKey,
    pub messages: Vec<Message>,
    pub created_at: Timestamp,
}

impl Conversation {
    pub fn new(key: ConversationKey, created_at: Timestamp) -> Self {
        Self {
            key,
            messages: Vec::new(),
            created_at,
        }
    }

    /// メッセージを末尾に追加する
    ///
    /// 作成時刻は会話内で単調非減少になるよう、直前のメッセージより過去の時刻は切り上げる。
    pub fn append(
        &mut self,
        sender_id: UserId,
        text: MessageText,
        now: Timestamp,
    ) -> Result<&Message, RepositoryError> {
        if !self.key.contains(&sender_id) {
            return Err(RepositoryError::NotAParticipant {
                user_id: sender_id.into_string(),
                conversation: self.key.to_string(),
            });
        }

        let created_at = match self.messages.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };
        self.messages.push(Message::new(sender_id, text, created_at));

        // push した直後なので必ず存在する
        Ok(&self.messages[self.messages.len() - 1])
    }

    /// `user_id` が未読の全メッセージを既読にする
    ///
    /// 1 件でも状態が変わった場合は `true` を返す。
    pub fn mark_seen(&mut self, user_id: &UserId, now: Timestamp) -> Result<bool, RepositoryError> {
        if !self.key.contains(user_id) {
            return Err(RepositoryError::NotAParticipant {
                user_id: user_id.as_str().to_string(),
                conversation: self.key.to_string(),
            });
        }

        let mut changed = false;
        for message in self.messages.iter_mut() {
            if message.seen_by.insert(user_id.clone()) {
                message.updated_at = message.updated_at.max(now);
                changed = true;
            }
        }
        Ok(changed)
    }

    /// `user_id` が未読のメッセージ数
    pub fn unseen_count_for(&self, user_id: &UserId) -> usize {
        self.messages
            .iter()
            .filter(|message| !message.is_seen_by(user_id))
            .count()
    }
}
