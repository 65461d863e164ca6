//! 接続ごとのチャットセッション（状態機械）
//!
//! ```text
//! Unidentified --join-chat--> Identified(user) --disconnect--> Disconnected
//!      |                                                           ^
//!      +-------------------------disconnect------------------------+
//! ```
//!
//! `Disconnected` は終端状態。1 つの接続の操作は受信ループで逐次処理されるため、
//! `Session` 自体はロックを持たない。

use super::{
    error::SessionError,
    value_object::{ConnectionId, UserId},
};

/// セッションの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unidentified,
    Identified(UserId),
    Disconnected,
}

/// 1 つの WebSocket 接続に対応するセッション
#[derive(Debug)]
pub struct Session {
    connection_id: ConnectionId,
    state: SessionState,
}

impl Session {
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            state: SessionState::Unidentified,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match &self.state {
            SessionState::Identified(user_id) => Some(user_id),
            _ => None,
        }
    }

    /// セッションをユーザーに紐付ける
    ///
    /// 既に同じユーザーとして紐付いている場合は何もしない。別のユーザーへの付け替えは拒否する。
    pub fn identify(&mut self, user_id: UserId) -> Result<(), SessionError> {
        match &self.state {
            SessionState::Unidentified => {}
            SessionState::Identified(current) if current == &user_id => return Ok(()),
            SessionState::Identified(current) => {
                return Err(SessionError::IdentityMismatch {
                    current: current.as_str().to_string(),
                    requested: user_id.into_string(),
                });
            }
            SessionState::Disconnected => return Err(SessionError::Disconnected),
        }

        self.state = SessionState::Identified(user_id);
        Ok(())
    }

    /// `Identified` であることを要求し、紐付いているユーザーを返す
    pub fn require_identified(&self) -> Result<&UserId, SessionError> {
        match &self.state {
            SessionState::Identified(user_id) => Ok(user_id),
            SessionState::Unidentified => Err(SessionError::NotIdentified),
            SessionState::Disconnected => Err(SessionError::Disconnected),
        }
    }

    /// イベントに含まれるユーザー ID がセッションのユーザーと一致することを要求する
    pub fn require_user(&self, user_id: &UserId) -> Result<(), SessionError> {
        let current = self.require_identified()?;
        if current == user_id {
            Ok(())
        } else {
            Err(SessionError::IdentityMismatch {
                current: current.as_str().to_string(),
                requested: user_id.as_str().to_string(),
            })
        }
    }

    /// 切断状態に遷移する
    ///
    /// 最初の呼び出しでのみ `true` を返す（冪等）。
    pub fn disconnect(&mut self) -> bool {
        if self.state == SessionState::Disconnected {
            return false;
        }
        self.state = SessionState::Disconnected;
        true
    }

    pub fn is_disconnected(&self) -> bool {
        self.state == SessionState::Disconnected
    }
}
