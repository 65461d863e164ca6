//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージの永続化、ルームへの配信、相手への未読数通知
//!
//! ### なぜこのテストが必要か
//! - チャットの中核となる処理
//! - 永続化に失敗したメッセージが配信されてはならない
//! - 同じ会話への送信順序が保存順序・配信順序と一致する必要がある
//!
//! ### どのような状況を想定しているか
//! - 正常系：初めてのメッセージ（会話が作られ、相手の未読数が 1 になる）
//! - 正常系：連続した送信の順序
//! - 正常系：送信者名がペイロードにない場合の補完
//! - 異常系：空のメッセージ、参加前の送信、別ユーザーとしての送信
//! - 異常系：永続化の失敗

use std::sync::Arc;

use crate::domain::{
    ConversationKey, ConversationRepository, DisplayName, Message, MessagePusher, MessageText,
    RoomMembership, ServerEvent, Session, UserDirectory, UserId,
};

use super::{
    keyed_lock::ConversationLocks, error::SendMessageError,
    unseen_notifier::UnseenCountsNotifier,
};

/// send-message イベントの内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageCommand {
    pub sender_id: UserId,
    pub target_id: UserId,
    /// ペイロードで指定された送信者名（空の場合は UserDirectory で補完）
    pub sender_name: DisplayName,
    /// 未検証のメッセージ本文
    pub text: String,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    repository: Arc<dyn ConversationRepository>,
    user_directory: Arc<dyn UserDirectory>,
    rooms: Arc<RoomMembership>,
    locks: Arc<ConversationLocks>,
    notifier: Arc<UnseenCountsNotifier>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl SendMessageUseCase {
    pub fn new(
        repository: Arc<dyn ConversationRepository>,
        user_directory: Arc<dyn UserDirectory>,
        rooms: Arc<RoomMembership>,
        locks: Arc<ConversationLocks>,
        notifier: Arc<UnseenCountsNotifier>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            user_directory,
            rooms,
            locks,
            notifier,
            message_pusher,
        }
    }

    /// メッセージ送信を実行
    ///
    /// 会話ごとのロックを保持したまま永続化とルームへの配信を行うため、
    /// 同じ会話では保存順序と配信順序が一致する。
    ///
    /// # Returns
    ///
    /// * `Ok(Message)` - 保存されたメッセージ
    /// * `Err(SendMessageError)` - 検証・プロトコル・永続化のいずれかのエラー（何も配信されない）
    pub async fn execute(
        &self,
        session: &Session,
        command: SendMessageCommand,
    ) -> Result<Message, SendMessageError> {
        session.require_user(&command.sender_id)?;
        let key = ConversationKey::new(command.sender_id.clone(), command.target_id.clone())?;
        let text = MessageText::new(command.text)?;

        let message = {
            let _guard = self.locks.acquire(&key).await;

            self.repository.get_or_create_conversation(&key).await?;
            let message = self
                .repository
                .append_message(&key, command.sender_id.clone(), text)
                .await?;

            // 送信者の接続もルームに参加させる
            let room_id = key.room_id();
            let connection_id = session.connection_id();
            self.rooms.join(room_id.clone(), connection_id).await;

            let sender_name = self
                .resolve_sender_name(&command.sender_id, command.sender_name)
                .await;
            let members = self.rooms.members(&room_id).await;
            tracing::info!(
                "Message from '{}' to '{}' delivered to {} connection(s) in room '{}'",
                command.sender_id,
                command.target_id,
                members.len(),
                room_id
            );
            let event = ServerEvent::MessageReceived {
                sender_name,
                message: message.clone(),
            };
            if let Err(e) = self.message_pusher.broadcast(members, &event).await {
                tracing::warn!("Failed to broadcast message-received: {}", e);
            }
            message
        };

        if let Err(e) = self.notifier.notify(&command.target_id).await {
            tracing::error!(
                "Failed to compute unseen counts for '{}': {}",
                command.target_id,
                e
            );
        }

        Ok(message)
    }

    async fn resolve_sender_name(&self, sender_id: &UserId, from_payload: DisplayName) -> DisplayName {
        if !from_payload.is_blank() {
            return from_payload;
        }
        match self.user_directory.find_display_name(sender_id).await {
            Ok(Some(display_name)) => display_name,
            Ok(None) => {
                tracing::debug!("No display name registered for '{}'", sender_id);
                from_payload
            }
            Err(e) => {
                tracing::warn!("Failed to look up display name of '{}': {}", sender_id, e);
                from_payload
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            MockConversationRepository, RepositoryError, SessionError, Timestamp,
            ValueObjectError,
        },
        usecase::test_support::{TestWorld, user},
    };
    use serde_json::{Value, json};

    fn command(sender: &str, target: &str, text: &str) -> SendMessageCommand {
        SendMessageCommand {
            sender_id: user(sender),
            target_id: user(target),
            sender_name: DisplayName::new("Alice", "Liddell"),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_message_creates_conversation() {
        // テスト項目: 初めてのメッセージで会話が作られ、送信者のみ既読、相手の未読数は 1
        // given (前提条件):
        let world = TestWorld::new();
        let mut alice = world.connect().await;
        let mut bob = world.connect().await;
        world.join(&mut alice, "alice", "bob").await;
        world.join(&mut bob, "bob", "alice").await;
        alice.drain();
        bob.drain();

        // when (操作):
        let message = world
            .send_message
            .execute(&mut alice.session, command("alice", "bob", "hi"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(message.sender_id, user("alice"));
        assert_eq!(message.text.as_str(), "hi");
        assert_eq!(message.created_at, Timestamp::new(1_000));
        assert_eq!(message.seen_by.iter().collect::<Vec<_>>(), vec![&user("alice")]);

        let conversation = world.conversation("alice", "bob").await.unwrap();
        assert_eq!(conversation.messages, vec![message]);

        let alice_events = alice.drain();
        assert_eq!(alice_events.len(), 1);
        assert_eq!(alice_events[0]["type"], "message-received");
        assert_eq!(alice_events[0]["senderFirstName"], "Alice");

        let bob_events = bob.drain();
        assert_eq!(bob_events.len(), 2);
        assert_eq!(bob_events[0]["type"], "message-received");
        assert_eq!(bob_events[0]["text"], "hi");
        assert_eq!(bob_events[1]["type"], "unseen-counts");
        assert_eq!(bob_events[1]["counts"], serde_json::json!({"alice": 1}));
    }

    #[tokio::test]
    async fn test_sender_joins_room_implicitly() {
        // テスト項目: join-chat していないルームへの送信でも、送信者の接続がルームに参加する
        let world = TestWorld::new();
        let mut alice = world.connect().await;
        world.join(&mut alice, "alice", "bob").await;
        alice.drain();

        world.send(&mut alice, "alice", "charlie", "hello").await;

        let room_id = ConversationKey::new(user("alice"), user("charlie"))
            .unwrap()
            .room_id();
        assert!(
            world
                .rooms
                .is_member(&room_id, alice.session.connection_id())
                .await
        );
        assert_eq!(alice.drain()[0]["type"], "message-received");
    }

    #[tokio::test]
    async fn test_sequential_sends_preserve_order() {
        // テスト項目: 連続した送信は保存順序・配信順序ともに送信順になる
        let world = TestWorld::new();
        let mut alice = world.connect().await;
        world.join(&mut alice, "alice", "bob").await;
        alice.drain();

        world.send(&mut alice, "alice", "bob", "first").await;
        world.send(&mut alice, "alice", "bob", "second").await;

        let conversation = world.conversation("alice", "bob").await.unwrap();
        let stored: Vec<&str> = conversation
            .messages
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(stored, vec!["first", "second"]);

        let delivered: Vec<String> = alice
            .drain()
            .into_iter()
            .map(|e| e["text"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(delivered, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_sender_name_falls_back_to_directory() {
        // テスト項目: ペイロードに送信者名がなければ UserDirectory の表示名が使われる
        let world = TestWorld::new();
        world
            .user_directory
            .insert(user("alice"), DisplayName::new("Alice", "Liddell"))
            .await;
        let mut alice = world.connect().await;
        world.join(&mut alice, "alice", "bob").await;
        alice.drain();

        let mut cmd = command("alice", "bob", "hi");
        cmd.sender_name = DisplayName::default();
        world
            .send_message
            .execute(&mut alice.session, cmd)
            .await
            .unwrap();

        let events = alice.drain();
        assert_eq!(events[0]["senderFirstName"], "Alice");
        assert_eq!(events[0]["senderLastName"], "Liddell");
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        // テスト項目: 空白のみのメッセージは拒否され、会話も作られない
        // given (前提条件):
        let world = TestWorld::new();
        let mut alice = world.connect().await;
        world.join(&mut alice, "alice", "bob").await;
        alice.drain();

        // when (操作):
        let result = world
            .send_message
            .execute(&mut alice.session, command("alice", "bob", "   "))
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SendMessageError::Validation(ValueObjectError::EmptyMessageText))
        );
        assert!(world.conversation("alice", "bob").await.is_none());
        assert!(alice.drain().is_empty());
    }

    #[tokio::test]
    async fn test_empty_text_does_not_append_to_existing_conversation() {
        // テスト項目: 既存の会話に空のメッセージを送っても追加されない
        let world = TestWorld::new();
        let mut alice = world.connect().await;
        world.join(&mut alice, "alice", "bob").await;
        world.send(&mut alice, "alice", "bob", "hi").await;

        let result = world
            .send_message
            .execute(&mut alice.session, command("alice", "bob", ""))
            .await;

        assert!(matches!(result, Err(SendMessageError::Validation(_))));
        let conversation = world.conversation("alice", "bob").await.unwrap();
        assert_eq!(conversation.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_both_sides_receive_messages_after_late_join() {
        // テスト項目: 送信後に相手が参加すると、以降はどちらからのメッセージも両方の接続に届く
        // given (前提条件):
        let world = TestWorld::new();
        let mut alice = world.connect().await;
        world.join(&mut alice, "alice", "bob").await;
        world.send(&mut alice, "alice", "bob", "hello").await;
        let mut bob = world.connect().await;
        world.join(&mut bob, "bob", "alice").await;
        alice.drain();
        bob.drain();

        // when (操作):
        world.send(&mut bob, "bob", "alice", "hey").await;
        world.send(&mut alice, "alice", "bob", "how are you").await;

        // then (期待する結果):
        for client in [&mut alice, &mut bob] {
            let texts: Vec<Value> = client
                .drain()
                .into_iter()
                .filter(|e| e["type"] == "message-received")
                .map(|e| e["text"].clone())
                .collect();
            assert_eq!(texts, vec![json!("hey"), json!("how are you")]);
        }
    }

    #[tokio::test]
    async fn test_send_before_join_is_rejected() {
        // テスト項目: join-chat 前の送信はプロトコルエラーになる
        let world = TestWorld::new();
        let mut alice = world.connect().await;

        let result = world
            .send_message
            .execute(&mut alice.session, command("alice", "bob", "hi"))
            .await;

        assert_eq!(
            result,
            Err(SendMessageError::Protocol(SessionError::NotIdentified))
        );
        assert!(world.conversation("alice", "bob").await.is_none());
    }

    #[tokio::test]
    async fn test_send_as_other_user_is_rejected() {
        // テスト項目: セッションと異なる送信者 ID での送信は拒否される
        let world = TestWorld::new();
        let mut alice = world.connect().await;
        world.join(&mut alice, "alice", "bob").await;

        let result = world
            .send_message
            .execute(&mut alice.session, command("bob", "alice", "spoofed"))
            .await;

        assert!(matches!(
            result,
            Err(SendMessageError::Protocol(SessionError::IdentityMismatch { .. }))
        ));
        assert!(world.conversation("alice", "bob").await.is_none());
    }

    #[tokio::test]
    async fn test_persistence_failure_broadcasts_nothing() {
        // テスト項目: 永続化に失敗した場合は何も配信されず、接続は引き続き使える
        // given (前提条件):
        let mut repository = MockConversationRepository::new();
        repository
            .expect_get_or_create_conversation()
            .returning(|_| Err(RepositoryError::Unavailable("store is down".to_string())));
        repository.expect_append_message().never();
        let world = TestWorld::with_repository(Arc::new(repository));
        let mut alice = world.connect().await;
        let mut bob = world.connect().await;
        world.join(&mut alice, "alice", "bob").await;
        world.join(&mut bob, "bob", "alice").await;
        alice.drain();
        bob.drain();

        // when (操作):
        let result = world
            .send_message
            .execute(&mut alice.session, command("alice", "bob", "hi"))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(SendMessageError::Persistence(_))));
        assert!(alice.drain().is_empty());
        assert!(bob.drain().is_empty());
        assert!(alice.session.require_identified().is_ok());
    }
}
