//! WebSocket event DTOs.
//!
//! Every frame is a JSON text frame with a kebab-case `type` discriminator and
//! camelCase fields.
//!
//! Client → server: `join-chat`, `send-message`, `mark-as-seen`.
//! Server → client: `online-users-snapshot`, `user-online`, `user-offline`,
//! `message-received`, `unseen-counts`, `error`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::ServerEvent;

// ========================================
// Client → Server
// ========================================

/// Events sent by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinChat(JoinChatPayload),
    SendMessage(SendMessagePayload),
    MarkAsSeen(MarkAsSeenPayload),
}

/// Subscribe to the room shared with `target_user_id` and announce presence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinChatPayload {
    pub user_id: String,
    pub target_user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
}

/// Deliver a chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub sender_id: String,
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_last_name: Option<String>,
    /// Missing text is treated like empty text and rejected by validation
    #[serde(default)]
    pub text: String,
}

/// Mark the conversation with `counterpart_id` as read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAsSeenPayload {
    pub user_id: String,
    pub counterpart_id: String,
}

// ========================================
// Server → Client
// ========================================

/// Message type discriminator for server events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    OnlineUsersSnapshot,
    UserOnline,
    UserOffline,
    MessageReceived,
    UnseenCounts,
    Error,
}

/// Current roster, sent privately right after connecting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUsersSnapshotMessage {
    pub r#type: MessageType,
    pub user_ids: Vec<String>,
}

/// Presence change broadcast to every connection
///
/// Shared by `user-online` and `user-offline`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceMessage {
    pub r#type: MessageType,
    pub user_id: String,
}

/// Chat message broadcast to the room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReceivedMessage {
    pub r#type: MessageType,
    pub sender_id: String,
    pub sender_first_name: String,
    pub sender_last_name: String,
    pub text: String,
    /// RFC 3339
    pub created_at: String,
    /// RFC 3339
    pub updated_at: String,
}

/// Unseen counts keyed by counterpart user id, sent privately
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnseenCountsMessage {
    pub r#type: MessageType,
    pub counts: BTreeMap<String, usize>,
}

/// Rejection sent to the originating connection only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub r#type: MessageType,
    pub code: String,
    pub message: String,
}

/// Encode a server event as a JSON text frame
pub fn encode_event(event: &ServerEvent) -> Result<String, serde_json::Error> {
    match event {
        ServerEvent::OnlineUsersSnapshot { user_ids } => {
            serde_json::to_string(&OnlineUsersSnapshotMessage::from_user_ids(user_ids))
        }
        ServerEvent::UserOnline { user_id } => {
            serde_json::to_string(&PresenceMessage::online(user_id))
        }
        ServerEvent::UserOffline { user_id } => {
            serde_json::to_string(&PresenceMessage::offline(user_id))
        }
        ServerEvent::MessageReceived {
            sender_name,
            message,
        } => serde_json::to_string(&MessageReceivedMessage::from_message(sender_name, message)),
        ServerEvent::UnseenCounts { counts } => {
            serde_json::to_string(&UnseenCountsMessage::from(counts))
        }
        ServerEvent::Error { code, message } => {
            serde_json::to_string(&ErrorMessage::new(*code, message))
        }
    }
}
