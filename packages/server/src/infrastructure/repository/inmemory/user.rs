//! InMemory User Directory 実装
//!
//! ユーザー管理サブシステムの代わりに、起動時に与えられた表示名の一覧を保持する。
//!
//! JSON ファイルの形式:
//!
//! ```json
//! {
//!   "64f1c2": { "firstName": "Alice", "lastName": "Liddell" },
//!   "64f1c3": { "firstName": "Bob", "lastName": "" }
//! }
//! ```

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::{DisplayName, RepositoryError, UserDirectory, UserId};

/// ユーザー一覧ファイルの読み込みエラー
#[derive(Debug, Error)]
pub enum UserDirectoryLoadError {
    #[error("failed to read user directory file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse user directory file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// インメモリ User Directory 実装
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: Mutex<HashMap<UserId, DisplayName>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (UserId, DisplayName)>) -> Self {
        Self {
            users: Mutex::new(entries.into_iter().collect()),
        }
    }

    /// JSON 文字列から作成
    pub fn from_json(json: &str) -> Result<Self, UserDirectoryLoadError> {
        let users: HashMap<UserId, DisplayName> = serde_json::from_str(json)?;
        Ok(Self::from_entries(users))
    }

    /// JSON ファイルから作成
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, UserDirectoryLoadError> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    /// 表示名を登録（既存の登録は上書き）
    pub async fn insert(&self, user_id: UserId, display_name: DisplayName) {
        self.users.lock().await.insert(user_id, display_name);
    }

    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.lock().await.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_display_name(
        &self,
        user_id: &UserId,
    ) -> Result<Option<DisplayName>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(users.get(user_id).cloned())
    }
}
