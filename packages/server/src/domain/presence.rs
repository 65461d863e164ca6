//! オンライン状態の管理
//!
//! ユーザー ID ごとに有効な接続の集合を保持する（参照カウント方式）。
//! 同じユーザーが複数のタブから接続していても、最後の接続が切れるまではオンラインのまま。

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tokio::sync::Mutex;

use super::value_object::{ConnectionId, UserId};

/// オンライン状態の変化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceChange {
    /// オフライン → オンライン
    BecameOnline,
    /// 既にオンライン（別の接続が存在する）
    AlreadyOnline,
    /// 最後の接続が切れてオフラインになった
    BecameOffline,
    /// まだ別の接続が残っている
    StillOnline,
}

#[derive(Default)]
struct PresenceTable {
    connections_by_user: BTreeMap<UserId, BTreeSet<ConnectionId>>,
    owner_by_connection: HashMap<ConnectionId, UserId>,
}

/// オンライン状態トラッカー
///
/// 全ての更新は 1 つのロックの下で行われるため、同じユーザーに対する
/// `mark_online` / `mark_offline` が競合しても更新は失われない。
#[derive(Default)]
pub struct PresenceTracker {
    table: Mutex<PresenceTable>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続を `user_id` の接続として登録する
    ///
    /// 接続が別のユーザーとして登録済みだった場合は、先にその登録を外す。
    pub async fn mark_online(&self, user_id: UserId, connection_id: ConnectionId) -> PresenceChange {
        let mut table = self.table.lock().await;

        if let Some(previous) = table.owner_by_connection.get(&connection_id).cloned() {
            if previous != user_id {
                remove_connection(&mut table, &previous, connection_id);
            }
        }

        let connections = table
            .connections_by_user
            .entry(user_id.clone())
            .or_default();
        let was_offline = connections.is_empty();
        connections.insert(connection_id);
        table.owner_by_connection.insert(connection_id, user_id);

        if was_offline {
            PresenceChange::BecameOnline
        } else {
            PresenceChange::AlreadyOnline
        }
    }

    /// 接続の登録を外す
    ///
    /// 一度もユーザーとして登録されていない接続の場合は `None`（何もしない）。
    pub async fn mark_offline(&self, connection_id: ConnectionId) -> Option<(UserId, PresenceChange)> {
        let mut table = self.table.lock().await;
        let user_id = table.owner_by_connection.get(&connection_id).cloned()?;
        let change = remove_connection(&mut table, &user_id, connection_id);
        Some((user_id, change))
    }

    pub async fn is_online(&self, user_id: &UserId) -> bool {
        let table = self.table.lock().await;
        table
            .connections_by_user
            .get(user_id)
            .is_some_and(|connections| !connections.is_empty())
    }

    /// オンラインのユーザー一覧（ユーザー ID 順）
    pub async fn snapshot(&self) -> Vec<UserId> {
        let table = self.table.lock().await;
        table.connections_by_user.keys().cloned().collect()
    }

    /// `user_id` の有効な接続一覧
    pub async fn connections_of(&self, user_id: &UserId) -> Vec<ConnectionId> {
        let table = self.table.lock().await;
        table
            .connections_by_user
            .get(user_id)
            .map(|connections| connections.iter().copied().collect())
            .unwrap_or_default()
    }

    /// 接続を所有しているユーザー
    pub async fn owner_of(&self, connection_id: ConnectionId) -> Option<UserId> {
        let table = self.table.lock().await;
        table.owner_by_connection.get(&connection_id).cloned()
    }
}

fn remove_connection(
    table: &mut PresenceTable,
    user_id: &UserId,
    connection_id: ConnectionId,
) -> PresenceChange {
    table.owner_by_connection.remove(&connection_id);

    let Some(connections) = table.connections_by_user.get_mut(user_id) else {
        return PresenceChange::BecameOffline;
    };
    connections.remove(&connection_id);
    if connections.is_empty() {
        table.connections_by_user.remove(user_id);
        PresenceChange::BecameOffline
    } else {
        PresenceChange::StillOnline
    }
}
