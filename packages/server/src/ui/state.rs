//! Shared application state.

use std::sync::Arc;

use crate::{
    domain::{ConversationRepository, MessagePusher, PresenceTracker, RoomMembership, UserDirectory},
    infrastructure::message_pusher::WebSocketMessagePusher,
    usecase::{
        ConnectSessionUseCase, ConversationLocks, DisconnectSessionUseCase, GetPresenceUseCase,
        GetUnseenCountsUseCase, JoinChatUseCase, MarkAsSeenUseCase, PresenceLocks,
        SendMessageUseCase, UnseenCountsNotifier,
    },
};

/// Shared application state
///
/// ハンドラはユースケースのみを通して状態にアクセスする。
pub struct AppState {
    /// ConnectSessionUseCase（接続のユースケース）
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// JoinChatUseCase（チャット参加のユースケース）
    pub join_chat_usecase: Arc<JoinChatUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// MarkAsSeenUseCase（既読化のユースケース）
    pub mark_as_seen_usecase: Arc<MarkAsSeenUseCase>,
    /// DisconnectSessionUseCase（切断のユースケース）
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// GetPresenceUseCase（オンラインユーザー一覧取得のユースケース）
    pub get_presence_usecase: Arc<GetPresenceUseCase>,
    /// GetUnseenCountsUseCase（未読数取得のユースケース）
    pub get_unseen_counts_usecase: Arc<GetUnseenCountsUseCase>,
}

impl AppState {
    /// 永続化層とユーザー情報の実装から、プロセス内で共有する状態とユースケースを組み立てる
    ///
    /// 1. PresenceTracker / RoomMembership / ConversationLocks / PresenceLocks
    /// 2. MessagePusher
    /// 3. UseCases
    pub fn new(
        repository: Arc<dyn ConversationRepository>,
        user_directory: Arc<dyn UserDirectory>,
    ) -> Self {
        let presence = Arc::new(PresenceTracker::new());
        let rooms = Arc::new(RoomMembership::new());
        let locks = Arc::new(ConversationLocks::new());
        let presence_locks = Arc::new(PresenceLocks::new());
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new());
        let notifier = Arc::new(UnseenCountsNotifier::new(
            repository.clone(),
            presence.clone(),
            message_pusher.clone(),
        ));

        Self {
            connect_session_usecase: Arc::new(ConnectSessionUseCase::new(
                presence.clone(),
                message_pusher.clone(),
            )),
            join_chat_usecase: Arc::new(JoinChatUseCase::new(
                presence.clone(),
                rooms.clone(),
                presence_locks.clone(),
                message_pusher.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                repository.clone(),
                user_directory,
                rooms.clone(),
                locks.clone(),
                notifier.clone(),
                message_pusher.clone(),
            )),
            mark_as_seen_usecase: Arc::new(MarkAsSeenUseCase::new(
                repository.clone(),
                locks,
                notifier.clone(),
            )),
            disconnect_session_usecase: Arc::new(DisconnectSessionUseCase::new(
                presence.clone(),
                rooms,
                presence_locks,
                message_pusher,
            )),
            get_presence_usecase: Arc::new(GetPresenceUseCase::new(presence)),
            get_unseen_counts_usecase: Arc::new(GetUnseenCountsUseCase::new(notifier)),
        }
    }
}
