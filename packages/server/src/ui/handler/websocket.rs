//! WebSocket connection handlers.
//!
//! 1 接続につき受信ループと送信タスク（pusher_loop）の 2 つを動かす。
//! 受信したイベントはこの接続の中で順番に処理される。

use std::{fmt, sync::Arc};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{ErrorCode, ServerEvent, Session, ValueObjectError},
    infrastructure::dto::websocket::ClientEvent,
    ui::state::AppState,
    usecase::{JoinChatCommand, MarkAsSeenCommand, Rejection, SendMessageCommand},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    // 送信タスクより先に登録し、スナップショットをチャネルに積んでおく
    let mut session = match state.connect_session_usecase.execute(tx).await {
        Ok((session, online_users)) => {
            tracing::info!(
                "Connection '{}' established ({} user(s) online)",
                session.connection_id(),
                online_users.len()
            );
            session
        }
        Err(e) => {
            tracing::error!("Failed to set up connection: {}", e);
            return;
        }
    };

    let connection_id = session.connection_id();
    let mut send_task = pusher_loop(rx, sender);

    let mut close_reason = None;
    tokio::select! {
        reason = receive_loop(&state, &mut session, &mut receiver) => close_reason = reason,
        _ = &mut send_task => {
            tracing::debug!("Push task for '{}' finished", connection_id);
        }
    };
    send_task.abort();

    state
        .disconnect_session_usecase
        .execute(&mut session, close_reason.as_deref())
        .await;
}

/// 接続が閉じるまでイベントを順番に処理し、クローズフレームの理由を返す
async fn receive_loop(
    state: &AppState,
    session: &mut Session,
    receiver: &mut SplitStream<WebSocket>,
) -> Option<String> {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::error!("WebSocket error on '{}': {}", session.connection_id(), e);
                return None;
            }
        };

        match msg {
            Message::Text(text) => {
                tracing::debug!(
                    "Received text from '{}': {}",
                    session.connection_id(),
                    text.as_str()
                );
                if let Some(rejection) = handle_text(state, session, text.as_str()).await {
                    reply(state, session, rejection).await;
                }
            }
            Message::Binary(_) => {
                tracing::warn!(
                    "Received binary frame from '{}', expected JSON text",
                    session.connection_id()
                );
                let rejection =
                    ServerEvent::error(ErrorCode::InvalidPayload, "binary frames are not supported");
                reply(state, session, rejection).await;
            }
            Message::Ping(_) => {
                tracing::debug!("Received ping");
            }
            Message::Close(frame) => {
                tracing::info!("Connection '{}' requested close", session.connection_id());
                return frame
                    .map(|f| f.reason.as_str().to_string())
                    .filter(|reason| !reason.is_empty());
            }
            Message::Pong(_) => {}
        }
    }
    None
}

/// 1 つのイベントを処理し、送信元に返すエラーイベントがあれば返す
async fn handle_text(state: &AppState, session: &mut Session, text: &str) -> Option<ServerEvent> {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Failed to parse client event: {}", e);
            return Some(ServerEvent::error(ErrorCode::InvalidPayload, e.to_string()));
        }
    };

    match event {
        ClientEvent::JoinChat(payload) => {
            let command = match JoinChatCommand::try_from(payload) {
                Ok(command) => command,
                Err(e) => return invalid("join-chat", &e),
            };
            match state.join_chat_usecase.execute(session, command).await {
                Ok(_) => None,
                Err(e) => rejected("join-chat", &e),
            }
        }
        ClientEvent::SendMessage(payload) => {
            let command = match SendMessageCommand::try_from(payload) {
                Ok(command) => command,
                Err(e) => return invalid("send-message", &e),
            };
            match state.send_message_usecase.execute(session, command).await {
                Ok(_) => None,
                Err(e) => rejected("send-message", &e),
            }
        }
        ClientEvent::MarkAsSeen(payload) => {
            let command = match MarkAsSeenCommand::try_from(payload) {
                Ok(command) => command,
                Err(e) => return invalid("mark-as-seen", &e),
            };
            match state.mark_as_seen_usecase.execute(session, command).await {
                Ok(_) => None,
                Err(e) => rejected("mark-as-seen", &e),
            }
        }
    }
}

fn invalid(operation: &str, error: &ValueObjectError) -> Option<ServerEvent> {
    tracing::warn!("Rejected {}: {}", operation, error);
    Some(error.into())
}

fn rejected<E>(operation: &str, error: &E) -> Option<ServerEvent>
where
    E: Rejection + fmt::Display,
{
    let rejection = error.rejection();
    if rejection.is_some() {
        tracing::warn!("Rejected {}: {}", operation, error);
    } else {
        tracing::error!("Failed to handle {}: {}", operation, error);
    }
    rejection
}

async fn reply(state: &AppState, session: &Session, event: ServerEvent) {
    if let Err(e) = state
        .connect_session_usecase
        .reply(session.connection_id(), &event)
        .await
    {
        tracing::warn!(
            "Failed to send error to '{}': {}",
            session.connection_id(),
            e
        );
    }
}
