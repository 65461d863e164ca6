//! UseCase: 既読処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - MarkAsSeenUseCase::execute() メソッド
//! - 会話の既読化と、自分の全接続への未読数の通知
//!
//! ### どのような状況を想定しているか
//! - 正常系：未読メッセージの既読化（未読数が 0 になる）
//! - 正常系：存在しない会話の既読化（変更なしだが未読数は送られる）
//! - 異常系：別ユーザーとしての既読化

use std::sync::Arc;

use crate::domain::{ConversationKey, ConversationRepository, Session, UserId};

use super::{
    keyed_lock::ConversationLocks, error::MarkAsSeenError,
    unseen_notifier::UnseenCountsNotifier,
};

/// mark-as-seen イベントの内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkAsSeenCommand {
    pub user_id: UserId,
    pub counterpart_id: UserId,
}

/// 既読化のユースケース
pub struct MarkAsSeenUseCase {
    repository: Arc<dyn ConversationRepository>,
    locks: Arc<ConversationLocks>,
    notifier: Arc<UnseenCountsNotifier>,
}

impl MarkAsSeenUseCase {
    pub fn new(
        repository: Arc<dyn ConversationRepository>,
        locks: Arc<ConversationLocks>,
        notifier: Arc<UnseenCountsNotifier>,
    ) -> Self {
        Self {
            repository,
            locks,
            notifier,
        }
    }

    /// 既読化を実行
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - 1 件以上のメッセージが既読になった
    /// * `Ok(false)` - 変更なし（会話が存在しない場合を含む）
    pub async fn execute(
        &self,
        session: &Session,
        command: MarkAsSeenCommand,
    ) -> Result<bool, MarkAsSeenError> {
        session.require_user(&command.user_id)?;
        let key = ConversationKey::new(command.user_id.clone(), command.counterpart_id.clone())?;

        let changed = {
            let _guard = self.locks.acquire(&key).await;
            self.repository.mark_seen(&key, &command.user_id).await?
        };
        tracing::info!(
            "User '{}' marked conversation with '{}' as seen (changed: {})",
            command.user_id,
            command.counterpart_id,
            changed
        );

        self.notifier.notify(&command.user_id).await?;
        Ok(changed)
    }
}
