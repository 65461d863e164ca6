//! UseCase: チャット参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinChatUseCase::execute() メソッド
//! - ルームへの参加、セッションの識別、オンライン状態の登録とブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 参加したルームにメッセージが配信される前提となる
//! - 同じユーザーの 2 つ目の接続でオンライン通知が重複しないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：初めての参加（user-online がブロードキャストされる）
//! - 正常系：同じユーザーの別接続からの参加（通知なし）
//! - 異常系：自分自身とのチャット、別ユーザーとしての再参加

use std::sync::Arc;

use crate::domain::{
    ConversationKey, MessagePusher, PresenceChange, PresenceTracker, RoomId, RoomMembership,
    ServerEvent, Session, UserId,
};

use super::{error::JoinChatError, keyed_lock::PresenceLocks};

/// join-chat イベントの内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinChatCommand {
    pub user_id: UserId,
    pub target_user_id: UserId,
    pub first_name: Option<String>,
}

/// チャット参加の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinChatOutcome {
    pub room_id: RoomId,
    pub presence_change: PresenceChange,
}

/// チャット参加のユースケース
pub struct JoinChatUseCase {
    presence: Arc<PresenceTracker>,
    rooms: Arc<RoomMembership>,
    presence_locks: Arc<PresenceLocks>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinChatUseCase {
    pub fn new(
        presence: Arc<PresenceTracker>,
        rooms: Arc<RoomMembership>,
        presence_locks: Arc<PresenceLocks>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            presence,
            rooms,
            presence_locks,
            message_pusher,
        }
    }

    /// チャット参加を実行
    ///
    /// 1. ルーム ID を導出し、接続をルームに参加させる（冪等）
    /// 2. セッションを `Identified` に遷移させる
    /// 3. オンライン状態を登録し、オフラインからの変化であれば全接続に通知する
    ///
    /// 3 はユーザーごとのロック内で行い、同じユーザーの切断と通知順序が入れ替わらないようにする。
    pub async fn execute(
        &self,
        session: &mut Session,
        command: JoinChatCommand,
    ) -> Result<JoinChatOutcome, JoinChatError> {
        let key = ConversationKey::new(command.user_id.clone(), command.target_user_id.clone())?;
        session.identify(command.user_id.clone())?;

        let connection_id = session.connection_id();
        let room_id = key.room_id();
        self.rooms.join(room_id.clone(), connection_id).await;
        tracing::info!(
            "Connection '{}' ({}, {}) joined room '{}' with '{}'",
            connection_id,
            command.user_id,
            command.first_name.as_deref().unwrap_or("-"),
            room_id,
            command.target_user_id
        );

        let presence_guard = self.presence_locks.acquire(&command.user_id).await;
        let presence_change = self
            .presence
            .mark_online(command.user_id.clone(), connection_id)
            .await;
        if presence_change == PresenceChange::BecameOnline {
            let event = ServerEvent::UserOnline {
                user_id: command.user_id.clone(),
            };
            if let Err(e) = self.message_pusher.broadcast_all(&event).await {
                tracing::warn!("Failed to broadcast user-online: {}", e);
            } else {
                tracing::info!("Broadcasted user-online for '{}'", command.user_id);
            }
        }
        drop(presence_guard);

        Ok(JoinChatOutcome {
            room_id,
            presence_change,
        })
    }
}
