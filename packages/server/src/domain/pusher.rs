//! MessagePusher trait 定義
//!
//! 接続中のクライアントへのメッセージ送信（通知）を抽象化します。
//! 具体的な実装は Infrastructure 層が提供します（`WebSocketMessagePusher` など）。
//! イベントのシリアライズも実装側の責務です。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, ServerEvent};

/// クライアントへのメッセージ送信用チャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続を登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の登録を解除
    async fn unregister_client(&self, connection_id: ConnectionId);

    /// 特定の接続にメッセージを送信
    async fn push_to(
        &self,
        connection_id: ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続にメッセージを送信（一部の送信失敗は許容）
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;

    /// 登録されている全ての接続にメッセージを送信
    async fn broadcast_all(&self, event: &ServerEvent) -> Result<(), MessagePushError>;

    /// 登録されている接続数
    async fn count_clients(&self) -> usize;
}
