//! ルーム（ブロードキャストグループ）
//!
//! ルームは永続化されない。2 人のユーザー ID から決定的に導出される ID をキーに、
//! その会話を購読している接続の集合を保持する。

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use super::value_object::{ConnectionId, UserId};

/// ルーム ID を導出する際の区切り文字
///
/// `UserId` はこの文字を含むことができない。
pub const ROOM_ID_SEPARATOR: char = '$';

/// ルーム ID
///
/// 2 人のユーザー ID を辞書順に並べて区切り文字で連結し、SHA-256 の 16 進表現を取ったもの。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    /// 2 人のユーザーに対応するルーム ID を導出する
    ///
    /// 引数の順序に依存しない: `derive(a, b) == derive(b, a)`
    pub fn derive(a: &UserId, b: &UserId) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let mut hasher = Sha256::new();
        hasher.update(first.as_str().as_bytes());
        hasher.update(ROOM_ID_SEPARATOR.to_string().as_bytes());
        hasher.update(second.as_str().as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Default)]
struct Membership {
    room_connections: HashMap<RoomId, HashSet<ConnectionId>>,
    connection_rooms: HashMap<ConnectionId, HashSet<RoomId>>,
}

/// ルームと接続の所属関係
///
/// join は冪等。接続が切断されたら `leave_all` で全ルームから抜け、空になったルームは破棄する。
#[derive(Default)]
pub struct RoomMembership {
    inner: Mutex<Membership>,
}

impl RoomMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続をルームに参加させる
    ///
    /// 新たに参加した場合は `true`、既に参加済みの場合は `false` を返す。
    pub async fn join(&self, room_id: RoomId, connection_id: ConnectionId) -> bool {
        let mut inner = self.inner.lock().await;
        let joined = inner
            .room_connections
            .entry(room_id.clone())
            .or_default()
            .insert(connection_id);
        inner
            .connection_rooms
            .entry(connection_id)
            .or_default()
            .insert(room_id);
        joined
    }

    /// 接続を全てのルームから退出させ、退出したルームを返す
    pub async fn leave_all(&self, connection_id: ConnectionId) -> Vec<RoomId> {
        let mut inner = self.inner.lock().await;
        let Some(rooms) = inner.connection_rooms.remove(&connection_id) else {
            return Vec::new();
        };

        for room_id in &rooms {
            if let Some(connections) = inner.room_connections.get_mut(room_id) {
                connections.remove(&connection_id);
                if connections.is_empty() {
                    inner.room_connections.remove(room_id);
                }
            }
        }

        let mut rooms: Vec<RoomId> = rooms.into_iter().collect();
        rooms.sort();
        rooms
    }

    /// ルームに参加している接続の一覧
    pub async fn members(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let inner = self.inner.lock().await;
        inner
            .room_connections
            .get(room_id)
            .map(|connections| connections.iter().copied().collect())
            .unwrap_or_default()
    }

    /// 接続が参加しているかどうか
    pub async fn is_member(&self, room_id: &RoomId, connection_id: ConnectionId) -> bool {
        let inner = self.inner.lock().await;
        inner
            .room_connections
            .get(room_id)
            .is_some_and(|connections| connections.contains(&connection_id))
    }

    /// 接続が 1 つ以上存在するルームの数
    pub async fn count_rooms(&self) -> usize {
        self.inner.lock().await.room_connections.len()
    }
}
