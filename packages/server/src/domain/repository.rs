//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 会話の永続化とユーザー情報の参照は、チャット機能の外側にある外部コラボレーターです。

use async_trait::async_trait;

use super::{
    ConversationKey, DisplayName, MessageText, RepositoryError, UserId,
    entity::{Conversation, Message},
};

/// Conversation Repository trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
/// 全ての失敗は `RepositoryError` として返され、呼び出し元で回復可能なものとして扱われる。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// 参加者ペアで会話を検索
    async fn find_conversation(
        &self,
        key: &ConversationKey,
    ) -> Result<Option<Conversation>, RepositoryError>;

    /// 空の会話を作成（既に存在する場合は `ConversationAlreadyExists`）
    async fn create_conversation(
        &self,
        key: &ConversationKey,
    ) -> Result<Conversation, RepositoryError>;

    /// 会話を取得し、存在しなければ作成する
    ///
    /// 両方の参加者が同時に最初のメッセージを送っても会話は 1 つしか作られない。
    async fn get_or_create_conversation(
        &self,
        key: &ConversationKey,
    ) -> Result<Conversation, RepositoryError>;

    /// メッセージを追加し、保存されたメッセージ（サーバー側のタイムスタンプ付き）を返す
    async fn append_message(
        &self,
        key: &ConversationKey,
        sender_id: UserId,
        text: MessageText,
    ) -> Result<Message, RepositoryError>;

    /// `user_id` が未読のメッセージを全て既読にする（状態が変わった場合は `true`）
    async fn mark_seen(
        &self,
        key: &ConversationKey,
        user_id: &UserId,
    ) -> Result<bool, RepositoryError>;

    /// `user_id` が参加している全ての会話
    async fn list_conversations_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Conversation>, RepositoryError>;
}

/// User Directory trait
///
/// ユーザー ID から表示名を引く。ユーザー管理サブシステムが所有するデータへの窓口。
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_display_name(
        &self,
        user_id: &UserId,
    ) -> Result<Option<DisplayName>, RepositoryError>;
}
