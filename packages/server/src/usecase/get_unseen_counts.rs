//! UseCase: 未読数の取得
//!
//! WebSocket の通知と同じ計算を、接続の有無に関わらず行う。

use std::sync::Arc;

use crate::domain::{RepositoryError, UnseenCounts, UserId};

use super::unseen_notifier::UnseenCountsNotifier;

pub struct GetUnseenCountsUseCase {
    notifier: Arc<UnseenCountsNotifier>,
}

impl GetUnseenCountsUseCase {
    pub fn new(notifier: Arc<UnseenCountsNotifier>) -> Self {
        Self { notifier }
    }

    pub async fn execute(&self, user_id: &UserId) -> Result<UnseenCounts, RepositoryError> {
        self.notifier.compute(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        domain::{MockConversationRepository, PresenceTracker},
        infrastructure::message_pusher::WebSocketMessagePusher,
        usecase::test_support::{TestWorld, user},
    };

    #[tokio::test]
    async fn test_get_unseen_counts_for_offline_user() {
        // テスト項目: オフラインのユーザーでも未読数が取得できる
        // given (前提条件):
        let world = TestWorld::new();
        let mut alice = world.connect().await;
        world.join(&mut alice, "alice", "bob").await;
        world.send(&mut alice, "alice", "bob", "one").await;
        world.send(&mut alice, "alice", "bob", "two").await;
        world.send(&mut alice, "alice", "charlie", "three").await;

        // when (操作):
        let counts = world.get_unseen_counts.execute(&user("bob")).await.unwrap();

        // then (期待する結果):
        assert_eq!(counts.get(&user("alice")), Some(&2));
        assert_eq!(counts.len(), 1);
    }

    #[tokio::test]
    async fn test_get_unseen_counts_repository_error() {
        // テスト項目: Repository のエラーがそのまま返される
        let mut repository = MockConversationRepository::new();
        repository
            .expect_list_conversations_for_user()
            .returning(|_| Err(RepositoryError::Unavailable("timeout".to_string())));
        let notifier = UnseenCountsNotifier::new(
            Arc::new(repository),
            Arc::new(PresenceTracker::new()),
            Arc::new(WebSocketMessagePusher::new()),
        );
        let usecase = GetUnseenCountsUseCase::new(Arc::new(notifier));

        let result = usecase.execute(&user("bob")).await;

        assert_eq!(
            result,
            Err(RepositoryError::Unavailable("timeout".to_string()))
        );
    }
}
