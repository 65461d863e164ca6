//! Conversion logic between DTOs and domain types.

use tomoshibi_shared::time::timestamp_to_rfc3339;

use crate::{
    domain::{DisplayName, ErrorCode, Message, UnseenCounts, UserId, ValueObjectError},
    infrastructure::dto::{
        http::{PresenceDto, UnseenCountsDto},
        websocket as dto,
    },
    usecase::{JoinChatCommand, MarkAsSeenCommand, SendMessageCommand},
};

// ========================================
// DTO → Command
// ========================================

impl TryFrom<dto::JoinChatPayload> for JoinChatCommand {
    type Error = ValueObjectError;

    fn try_from(payload: dto::JoinChatPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::new(payload.user_id)?,
            target_user_id: UserId::new(payload.target_user_id)?,
            first_name: payload.first_name,
        })
    }
}

/// メッセージ本文の検証はユースケースで行う
impl TryFrom<dto::SendMessagePayload> for SendMessageCommand {
    type Error = ValueObjectError;

    fn try_from(payload: dto::SendMessagePayload) -> Result<Self, Self::Error> {
        Ok(Self {
            sender_id: UserId::new(payload.sender_id)?,
            target_id: UserId::new(payload.target_id)?,
            sender_name: DisplayName::new(
                payload.sender_first_name.unwrap_or_default(),
                payload.sender_last_name.unwrap_or_default(),
            ),
            text: payload.text,
        })
    }
}

impl TryFrom<dto::MarkAsSeenPayload> for MarkAsSeenCommand {
    type Error = ValueObjectError;

    fn try_from(payload: dto::MarkAsSeenPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::new(payload.user_id)?,
            counterpart_id: UserId::new(payload.counterpart_id)?,
        })
    }
}

// ========================================
// Domain → DTO (WebSocket)
// ========================================

impl dto::OnlineUsersSnapshotMessage {
    pub fn from_user_ids(user_ids: &[UserId]) -> Self {
        Self {
            r#type: dto::MessageType::OnlineUsersSnapshot,
            user_ids: user_ids.iter().map(|id| id.as_str().to_string()).collect(),
        }
    }
}

impl dto::PresenceMessage {
    pub fn online(user_id: &UserId) -> Self {
        Self {
            r#type: dto::MessageType::UserOnline,
            user_id: user_id.as_str().to_string(),
        }
    }

    pub fn offline(user_id: &UserId) -> Self {
        Self {
            r#type: dto::MessageType::UserOffline,
            user_id: user_id.as_str().to_string(),
        }
    }
}

impl dto::MessageReceivedMessage {
    pub fn from_message(sender_name: &DisplayName, message: &Message) -> Self {
        Self {
            r#type: dto::MessageType::MessageReceived,
            sender_id: message.sender_id.as_str().to_string(),
            sender_first_name: sender_name.first_name.clone(),
            sender_last_name: sender_name.last_name.clone(),
            text: message.text.as_str().to_string(),
            created_at: timestamp_to_rfc3339(message.created_at.value()),
            updated_at: timestamp_to_rfc3339(message.updated_at.value()),
        }
    }
}

impl From<&UnseenCounts> for dto::UnseenCountsMessage {
    fn from(counts: &UnseenCounts) -> Self {
        Self {
            r#type: dto::MessageType::UnseenCounts,
            counts: counts
                .iter()
                .map(|(user_id, count)| (user_id.as_str().to_string(), *count))
                .collect(),
        }
    }
}

impl dto::ErrorMessage {
    pub fn new(code: ErrorCode, message: &str) -> Self {
        Self {
            r#type: dto::MessageType::Error,
            code: code.as_str().to_string(),
            message: message.to_string(),
        }
    }
}

// ========================================
// Domain → DTO (HTTP)
// ========================================

impl PresenceDto {
    pub fn from_user_ids(user_ids: Vec<UserId>) -> Self {
        Self {
            count: user_ids.len(),
            online_user_ids: user_ids.into_iter().map(UserId::into_string).collect(),
        }
    }
}

impl UnseenCountsDto {
    pub fn new(user_id: &UserId, counts: &UnseenCounts) -> Self {
        Self {
            user_id: user_id.as_str().to_string(),
            counts: counts
                .iter()
                .map(|(counterpart, count)| (counterpart.as_str().to_string(), *count))
                .collect(),
            total: counts.values().sum(),
        }
    }
}
