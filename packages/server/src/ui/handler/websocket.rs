//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::HeaderMap,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::Identity,
    infrastructure::dto::websocket::{InboundMessage, OutboundMessage},
    ui::{
        identity::resolve_identity,
        session::{ConnectionSession, SessionError},
        state::AppState,
    },
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let identity = resolve_identity(&headers, &state.identity_header);
    tracing::info!("WebSocket upgrade requested by '{}'", identity);

    ws.on_upgrade(move |socket| handle_socket(socket, state, identity))
}

/// Spawns a task that drains the session's outbound queue into the WebSocket sender.
///
/// A failed write ends the task, which the receive loop treats as the end of the connection.
fn pusher_loop(
    mut rx: mpsc::Receiver<OutboundMessage>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize outbound message: {}", e);
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(json.into())).await {
                tracing::debug!("Failed to write frame: {}", e);
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, identity: Identity) {
    let (sender, mut receiver) = socket.split();

    let (outbound_tx, outbound_rx) = mpsc::channel(state.queue_capacity);
    let mut send_task = pusher_loop(outbound_rx, sender);
    let mut session = ConnectionSession::new(identity.clone(), state, outbound_tx);

    match receive_loop(&mut receiver, &mut send_task, &mut session).await {
        Ok(()) => tracing::info!("Connection of '{}' closed", identity),
        Err(e) => tracing::warn!("Connection of '{}' terminated: {}", identity, e),
    }

    // 退出より先に書き込み側を止める（配信ループの送信は失敗して終わる）
    send_task.abort();

    // 切断時は参加中のルームから必ず抜ける
    session.close().await;
}

/// Read frames until the peer closes, the writer dies or a frame violates the protocol.
async fn receive_loop(
    receiver: &mut SplitStream<WebSocket>,
    send_task: &mut JoinHandle<()>,
    session: &mut ConnectionSession,
) -> Result<(), SessionError> {
    loop {
        let frame = tokio::select! {
            frame = receiver.next() => frame,
            _ = &mut *send_task => return Err(SessionError::OutboundClosed),
        };

        let message = match frame {
            None => return Ok(()),
            Some(Err(e)) => return Err(e.into()),
            Some(Ok(Message::Text(text))) => {
                tracing::debug!("Received text from '{}': {}", session.identity(), text.as_str());
                InboundMessage::decode(text.as_str())?
            }
            Some(Ok(Message::Binary(bytes))) => InboundMessage::decode_slice(&bytes)?,
            Some(Ok(Message::Close(_))) => {
                tracing::info!("Client '{}' requested close", session.identity());
                return Ok(());
            }
            // Ping/pong is handled automatically by the WebSocket protocol
            Some(Ok(_)) => continue,
        };

        session.handle(message).await?;
    }
}
