//! UseCase: オンラインユーザー一覧の取得

use std::sync::Arc;

use crate::domain::{PresenceTracker, UserId};

pub struct GetPresenceUseCase {
    presence: Arc<PresenceTracker>,
}

impl GetPresenceUseCase {
    pub fn new(presence: Arc<PresenceTracker>) -> Self {
        Self { presence }
    }

    /// オンラインのユーザー ID を辞書順で返す
    pub async fn execute(&self) -> Vec<UserId> {
        self.presence.snapshot().await
    }
}
