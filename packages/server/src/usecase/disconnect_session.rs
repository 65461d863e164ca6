//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectSessionUseCase::execute() メソッド
//! - 接続の登録解除、ルームからの退出、オフライン通知
//!
//! ### なぜこのテストが必要か
//! - 古い接続の切断で、新しい接続のオンライン状態が消えてはならない
//! - 切断済みの接続がルームに残るとメッセージの配信先が増え続ける
//!
//! ### どのような状況を想定しているか
//! - 正常系：最後の接続の切断（user-offline がブロードキャストされる）
//! - 正常系：同じユーザーの別接続が残っている場合（通知なし）
//! - 正常系：join-chat 前の切断、2 回目の切断（何もしない）

use std::sync::Arc;

use crate::domain::{
    MessagePusher, PresenceChange, PresenceTracker, RoomId, RoomMembership, ServerEvent, Session,
    UserId,
};

use super::keyed_lock::PresenceLocks;

/// 切断の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisconnectOutcome {
    /// 識別済みだった場合のユーザー
    pub user_id: Option<UserId>,
    pub left_rooms: Vec<RoomId>,
    pub presence_change: Option<PresenceChange>,
}

/// 切断のユースケース
pub struct DisconnectSessionUseCase {
    presence: Arc<PresenceTracker>,
    rooms: Arc<RoomMembership>,
    presence_locks: Arc<PresenceLocks>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectSessionUseCase {
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

    /// 切断を実行
    ///
    /// 冪等。既に切断済みのセッションに対しては `None` を返す。
    /// オフライン登録と user-offline の通知は、同じユーザーの join-chat とユーザーごとのロックで直列化する。
    pub async fn execute(
        &self,
        session: &mut Session,
        reason: Option<&str>,
    ) -> Option<DisconnectOutcome> {
        let user_id = session.user_id().cloned();
        if !session.disconnect() {
            return None;
        }

        let connection_id = session.connection_id();
        self.message_pusher.unregister_client(connection_id).await;
        let left_rooms = self.rooms.leave_all(connection_id).await;

        let presence_guard = match &user_id {
            Some(user_id) => Some(self.presence_locks.acquire(user_id).await),
            None => None,
        };
        let presence_change = match self.presence.mark_offline(connection_id).await {
            Some((owner, change)) => {
                if change == PresenceChange::BecameOffline {
                    let event = ServerEvent::UserOffline {
                        user_id: owner.clone(),
                    };
                    if let Err(e) = self.message_pusher.broadcast_all(&event).await {
                        tracing::warn!("Failed to broadcast user-offline: {}", e);
                    } else {
                        tracing::info!("Broadcasted user-offline for '{}'", owner);
                    }
                }
                Some(change)
            }
            None => None,
        };
        drop(presence_guard);

        tracing::info!(
            "Connection '{}' ({}) disconnected, left {} room(s), reason: {}",
            connection_id,
            user_id.as_ref().map(UserId::as_str).unwrap_or("-"),
            left_rooms.len(),
            reason.unwrap_or("-")
        );

        Some(DisconnectOutcome {
            user_id,
            left_rooms,
            presence_change,
        })
    }
}
