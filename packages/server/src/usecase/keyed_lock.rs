//! キーごとの排他制御
//!
//! - 会話ごと: 同じ会話へのメッセージ送信を直列化し、永続化の順序とブロードキャストの順序を一致させる
//! - ユーザーごと: オンライン状態の変更と user-online / user-offline の通知を 1 つの操作として直列化する
//!
//! 異なるキーのロックは互いにブロックしない。

use std::{collections::HashMap, hash::Hash, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{ConversationKey, UserId};

/// 会話キーごとのロック
pub type ConversationLocks = KeyedLocks<ConversationKey>;

/// ユーザーごとのオンライン状態通知のロック
pub type PresenceLocks = KeyedLocks<UserId>;

/// キーごとの非同期ロック
pub struct KeyedLocks<K> {
    locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// キーのロックを取得する（ガードを drop すると解放）
    pub async fn acquire(&self, key: &K) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // 誰も保持していないロックはここで片付ける
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(key.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// 保持中のロックの数
    pub async fn count(&self) -> usize {
        self.locks.lock().await.len()
    }
}
