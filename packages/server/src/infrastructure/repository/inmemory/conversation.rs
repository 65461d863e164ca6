//! InMemory Conversation Repository 実装
//!
//! ドメイン層が定義する ConversationRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! 全ての操作は 1 つのロックの下で行われるため、get-or-create は
//! 同時に呼ばれても会話を 1 つしか作らない。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tomoshibi_shared::time::Clock;

use crate::domain::{
    Conversation, ConversationKey, ConversationRepository, Message, MessageText, RepositoryError,
    Timestamp, UserId,
};

/// インメモリ Conversation Repository 実装
pub struct InMemoryConversationRepository {
    conversations: Mutex<HashMap<ConversationKey, Conversation>>,
    /// 永続化時刻を払い出す時計
    clock: Arc<dyn Clock>,
}

impl InMemoryConversationRepository {
    /// 新しい InMemoryConversationRepository を作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            conversations: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// 保存されている会話の数
    pub async fn count_conversations(&self) -> usize {
        self.conversations.lock().await.len()
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn find_conversation(
        &self,
        key: &ConversationKey,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let conversations = self.conversations.lock().await;
        Ok(conversations.get(key).cloned())
    }

    async fn create_conversation(
        &self,
        key: &ConversationKey,
    ) -> Result<Conversation, RepositoryError> {
        let mut conversations = self.conversations.lock().await;
        if conversations.contains_key(key) {
            return Err(RepositoryError::ConversationAlreadyExists(key.to_string()));
        }

        let conversation = Conversation::new(key.clone(), self.now());
        conversations.insert(key.clone(), conversation.clone());
        tracing::debug!("Conversation '{}' created", key);
        Ok(conversation)
    }

    async fn get_or_create_conversation(
        &self,
        key: &ConversationKey,
    ) -> Result<Conversation, RepositoryError> {
        let now = self.now();
        let mut conversations = self.conversations.lock().await;
        let conversation = conversations.entry(key.clone()).or_insert_with(|| {
            tracing::debug!("Conversation '{}' created", key);
            Conversation::new(key.clone(), now)
        });
        Ok(conversation.clone())
    }

    async fn append_message(
        &self,
        key: &ConversationKey,
        sender_id: UserId,
        text: MessageText,
    ) -> Result<Message, RepositoryError> {
        let now = self.now();
        let mut conversations = self.conversations.lock().await;
        let conversation = conversations
            .get_mut(key)
            .ok_or_else(|| RepositoryError::ConversationNotFound(key.to_string()))?;
        let message = conversation.append(sender_id, text, now)?;
        Ok(message.clone())
    }

    async fn mark_seen(
        &self,
        key: &ConversationKey,
        user_id: &UserId,
    ) -> Result<bool, RepositoryError> {
        let now = self.now();
        let mut conversations = self.conversations.lock().await;
        match conversations.get_mut(key) {
            Some(conversation) => conversation.mark_seen(user_id, now),
            None => Ok(false),
        }
    }

    async fn list_conversations_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let conversations = self.conversations.lock().await;
        let mut result: Vec<Conversation> = conversations
            .values()
            .filter(|conversation| conversation.key.contains(user_id))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(result)
    }
}
