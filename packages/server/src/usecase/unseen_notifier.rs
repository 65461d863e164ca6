//! 未読数の通知
//!
//! SendMessage（相手への通知）と MarkAsSeen（自分への通知）で共有する。

use std::sync::Arc;

use crate::domain::{
    ConversationRepository, MessagePusher, PresenceTracker, RepositoryError, ServerEvent,
    UnseenCounts, UserId, unseen_counts,
};

/// 未読数を再計算し、ユーザーの全接続に通知する
pub struct UnseenCountsNotifier {
    repository: Arc<dyn ConversationRepository>,
    presence: Arc<PresenceTracker>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl UnseenCountsNotifier {
    pub fn new(
        repository: Arc<dyn ConversationRepository>,
        presence: Arc<PresenceTracker>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            presence,
            message_pusher,
        }
    }

    /// 未読数を計算する（キャッシュしない）
    pub async fn compute(&self, user_id: &UserId) -> Result<UnseenCounts, RepositoryError> {
        let conversations = self.repository.list_conversations_for_user(user_id).await?;
        Ok(unseen_counts(user_id, &conversations))
    }

    /// 未読数を計算し、オンラインであれば `user_id` の全接続に送る
    ///
    /// オフラインの場合は計算もしない。通知した場合は計算結果を返す。
    pub async fn notify(&self, user_id: &UserId) -> Result<Option<UnseenCounts>, RepositoryError> {
        let connections = self.presence.connections_of(user_id).await;
        if connections.is_empty() {
            tracing::debug!("User '{}' is offline, skipping unseen counts", user_id);
            return Ok(None);
        }

        let counts = self.compute(user_id).await?;
        let event = ServerEvent::UnseenCounts {
            counts: counts.clone(),
        };
        if let Err(e) = self.message_pusher.broadcast(connections, &event).await {
            tracing::warn!("Failed to push unseen counts to '{}': {}", user_id, e);
        }
        Ok(Some(counts))
    }
}
