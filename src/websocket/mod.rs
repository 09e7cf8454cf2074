pub mod events;
pub mod registry;

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::services::ConversationRelay;
use crate::state::AppState;

use events::ClientEvent;
use registry::ConnectionId;

/// `GET /ws`: upgrade and hand the socket to its connection task. No guard at
/// upgrade time; authentication happens in-band over the socket.
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// One task per connection: a select loop over the outbound queue and the
/// inbound stream, so a single client's events stay in arrival order.
async fn handle_socket(state: AppState, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut outbound) = mpsc::unbounded_channel::<String>();
    let conn = state.registry.register(tx).await;
    tracing::info!(connection = %conn, "websocket opened");

    loop {
        tokio::select! {
            maybe_frame = outbound.recv() => {
                let Some(frame) = maybe_frame else { break };
                if sink.send(WsMessage::Text(frame)).await.is_err() {
                    break;
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(WsMessage::Text(text))) => dispatch(&state, conn, &text).await,
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    // pings are answered by the transport; binary is ignored
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(connection = %conn, error = %e, "websocket read failed");
                        break;
                    }
                }
            }
        }
    }

    state.registry.remove(conn).await;
    tracing::info!(connection = %conn, "websocket closed");
}

async fn dispatch(state: &AppState, conn: ConnectionId, raw: &str) {
    let event = match serde_json::from_str::<ClientEvent>(raw) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(connection = %conn, error = %e, "unparsable frame ignored");
            return;
        }
    };

    match event {
        ClientEvent::Authenticate { token } => {
            ConversationRelay::on_authenticate(
                &state.registry,
                state.principals.as_ref(),
                state.conversations.as_ref(),
                &state.token_codec,
                conn,
                &token,
            )
            .await;
        }
        ClientEvent::Typing {
            conversation_id,
            counterpart_id,
        } => {
            ConversationRelay::on_typing(&state.registry, conn, conversation_id, counterpart_id)
                .await;
        }
        ClientEvent::Message {
            conversation_id,
            sender_id,
            body,
        } => {
            ConversationRelay::on_message(
                &state.registry,
                state.messages.as_ref(),
                conn,
                conversation_id,
                sender_id,
                &body,
            )
            .await;
        }
    }
}
