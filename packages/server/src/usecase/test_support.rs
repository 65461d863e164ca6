//! UseCase テスト用の組み立て
//!
//! 実際のインメモリ実装と `FixedClock` でユースケース一式を組み立て、
//! 各接続の受信チャネルから届いた JSON を取り出せるようにする。

use std::sync::Arc;

use tokio::sync::mpsc;
use tomoshibi_shared::time::FixedClock;

use crate::{
    domain::{
        Conversation, ConversationKey, ConversationRepository, DisplayName, Message,
        PresenceTracker, RoomMembership, Session, UserId,
    },
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryConversationRepository, InMemoryUserDirectory},
    },
};

use super::{
    ConnectSessionUseCase, ConversationLocks, DisconnectSessionUseCase, GetPresenceUseCase,
    GetUnseenCountsUseCase, JoinChatCommand, JoinChatUseCase, MarkAsSeenUseCase, PresenceLocks,
    SendMessageCommand, SendMessageUseCase, UnseenCountsNotifier,
};

pub(crate) const TEST_NOW_MILLIS: i64 = 1_000;

pub(crate) fn user(id: &str) -> UserId {
    UserId::new(id.to_string()).unwrap()
}

/// テスト用の接続（セッションと受信チャネル）
pub(crate) struct TestClient {
    pub session: Session,
    receiver: mpsc::UnboundedReceiver<String>,
}

impl TestClient {
    /// これまでに届いたイベントを全て取り出す
    pub fn drain(&mut self) -> Vec<serde_json::Value> {
        let mut events = Vec::new();
        while let Ok(text) = self.receiver.try_recv() {
            events.push(serde_json::from_str(&text).unwrap());
        }
        events
    }
}

pub(crate) struct TestWorld {
    pub presence: Arc<PresenceTracker>,
    pub rooms: Arc<RoomMembership>,
    pub repository: Arc<dyn ConversationRepository>,
    pub user_directory: Arc<InMemoryUserDirectory>,
    pub message_pusher: Arc<WebSocketMessagePusher>,
    pub connect_session: ConnectSessionUseCase,
    pub join_chat: JoinChatUseCase,
    pub send_message: SendMessageUseCase,
    pub mark_as_seen: MarkAsSeenUseCase,
    pub disconnect_session: DisconnectSessionUseCase,
    pub get_presence: GetPresenceUseCase,
    pub get_unseen_counts: GetUnseenCountsUseCase,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::with_repository(Arc::new(InMemoryConversationRepository::new(Arc::new(
            FixedClock::new(TEST_NOW_MILLIS),
        ))))
    }

    pub fn with_repository(repository: Arc<dyn ConversationRepository>) -> Self {
        let presence = Arc::new(PresenceTracker::new());
        let rooms = Arc::new(RoomMembership::new());
        let user_directory = Arc::new(InMemoryUserDirectory::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let locks = Arc::new(ConversationLocks::new());
        let presence_locks = Arc::new(PresenceLocks::new());
        let notifier = Arc::new(UnseenCountsNotifier::new(
            repository.clone(),
            presence.clone(),
            message_pusher.clone(),
        ));

        Self {
            connect_session: ConnectSessionUseCase::new(presence.clone(), message_pusher.clone()),
            join_chat: JoinChatUseCase::new(
                presence.clone(),
                rooms.clone(),
                presence_locks.clone(),
                message_pusher.clone(),
            ),
            send_message: SendMessageUseCase::new(
                repository.clone(),
                user_directory.clone(),
                rooms.clone(),
                locks.clone(),
                notifier.clone(),
                message_pusher.clone(),
            ),
            mark_as_seen: MarkAsSeenUseCase::new(repository.clone(), locks, notifier.clone()),
            disconnect_session: DisconnectSessionUseCase::new(
                presence.clone(),
                rooms.clone(),
                presence_locks,
                message_pusher.clone(),
            ),
            get_presence: GetPresenceUseCase::new(presence.clone()),
            get_unseen_counts: GetUnseenCountsUseCase::new(notifier),
            presence,
            rooms,
            repository,
            user_directory,
            message_pusher,
        }
    }

    pub async fn connect(&self) -> TestClient {
        let (tx, receiver) = mpsc::unbounded_channel();
        let (session, _) = self.connect_session.execute(tx).await.unwrap();
        TestClient { session, receiver }
    }

    pub fn join_command(&self, user_id: &str, target_user_id: &str) -> JoinChatCommand {
        JoinChatCommand {
            user_id: user(user_id),
            target_user_id: user(target_user_id),
            first_name: None,
        }
    }

    pub async fn join(&self, client: &mut TestClient, user_id: &str, target_user_id: &str) {
        self.join_chat
            .execute(&mut client.session, self.join_command(user_id, target_user_id))
            .await
            .unwrap();
    }

    pub async fn send(
        &self,
        client: &mut TestClient,
        sender_id: &str,
        target_id: &str,
        text: &str,
    ) -> Message {
        let command = SendMessageCommand {
            sender_id: user(sender_id),
            target_id: user(target_id),
            sender_name: DisplayName::default(),
            text: text.to_string(),
        };
        self.send_message
            .execute(&mut client.session, command)
            .await
            .unwrap()
    }

    pub async fn conversation(&self, a: &str, b: &str) -> Option<Conversation> {
        let key = ConversationKey::new(user(a), user(b)).unwrap();
        self.repository.find_conversation(&key).await.unwrap()
    }
}
