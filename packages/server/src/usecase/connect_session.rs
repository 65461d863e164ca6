//! UseCase: 接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectSessionUseCase::execute() メソッド
//! - 接続の登録と、オンラインユーザー一覧の送信
//!
//! ### どのような状況を想定しているか
//! - 正常系：誰もオンラインでない状態での接続
//! - 正常系：既にオンラインのユーザーがいる状態での接続（一覧は新しい接続にのみ送られる）
//! - 異常系：一覧を送る前に受信側が閉じた接続（登録が残らない）

use std::sync::Arc;

use crate::domain::{
    ConnectionId, MessagePushError, MessagePusher, PresenceTracker, PusherChannel, ServerEvent,
    Session, UserId,
};

/// 接続のユースケース
pub struct ConnectSessionUseCase {
    presence: Arc<PresenceTracker>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectSessionUseCase {
    pub fn new(presence: Arc<PresenceTracker>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            presence,
            message_pusher,
        }
    }

    /// 接続を実行
    ///
    /// 新しい接続を登録し、現在のオンラインユーザー一覧をその接続にだけ送る。
    ///
    /// # Returns
    ///
    /// * `Ok((Session, Vec<UserId>))` - `Unidentified` 状態のセッションと送信した一覧
    /// * `Err(MessagePushError)` - 一覧の送信に失敗（接続の登録は取り消される）
    pub async fn execute(
        &self,
        sender: PusherChannel,
    ) -> Result<(Session, Vec<UserId>), MessagePushError> {
        let connection_id = ConnectionId::generate();
        self.message_pusher
            .register_client(connection_id, sender)
            .await;

        let user_ids = self.presence.snapshot().await;
        let snapshot = ServerEvent::OnlineUsersSnapshot {
            user_ids: user_ids.clone(),
        };
        if let Err(e) = self.message_pusher.push_to(connection_id, &snapshot).await {
            self.message_pusher.unregister_client(connection_id).await;
            return Err(e);
        }

        Ok((Session::new(connection_id), user_ids))
    }

    /// この接続にだけイベントを送る（エラーの返信に使う）
    pub async fn reply(
        &self,
        connection_id: ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        self.message_pusher.push_to(connection_id, event).await
    }
}
