use uuid::Uuid;

use crate::security::token::SessionTokenCodec;
use crate::services::session::SessionService;
use crate::stores::{ConversationStore, MessageStore, PrincipalStore};
use crate::websocket::events::ServerEvent;
use crate::websocket::registry::{ConnectionId, ConnectionRegistry};

/// Routes realtime events between a connection and its conversation rooms.
pub struct ConversationRelay;

impl ConversationRelay {
    /// Handle the in-band `authenticate` handshake.
    ///
    /// Failure leaves the connection registered, unauthenticated, and open;
    /// nothing is emitted back. Success binds the principal, joins one room
    /// per conversation, and acks with the sanitized profile. Re-running a
    /// successful handshake is idempotent.
    pub async fn on_authenticate(
        registry: &ConnectionRegistry,
        principals: &dyn PrincipalStore,
        conversations: &dyn ConversationStore,
        codec: &SessionTokenCodec,
        conn: ConnectionId,
        token: &str,
    ) {
        let profile = match SessionService::authenticate(principals, codec, token, None).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(connection = %conn, error = %e, "realtime authentication failed");
                return;
            }
        };

        registry.bind_principal(conn, profile.id).await;

        // A failed room lookup joins nothing but keeps the session usable.
        let rooms: Vec<Uuid> = match conversations.conversations_of(profile.id).await {
            Ok(list) => list.into_iter().map(|c| c.id).collect(),
            Err(e) => {
                tracing::warn!(connection = %conn, error = %e, "room lookup failed");
                Vec::new()
            }
        };
        registry.join_rooms(conn, &rooms).await;
        tracing::info!(
            connection = %conn,
            principal = %profile.id,
            rooms = rooms.len(),
            "connection authenticated"
        );

        match serde_json::to_string(&ServerEvent::Authenticated { principal: profile }) {
            Ok(frame) => registry.send_to(conn, &frame).await,
            Err(e) => tracing::error!(error = %e, "failed to encode authenticated ack"),
        }
    }

    /// Relay a typing indicator to every other member of the room. Nothing is
    /// persisted. Unauthenticated or non-member senders are dropped silently.
    pub async fn on_typing(
        registry: &ConnectionRegistry,
        conn: ConnectionId,
        conversation_id: Uuid,
        counterpart_id: Uuid,
    ) {
        if registry.principal_of(conn).await.is_none() {
            tracing::debug!(connection = %conn, "typing from unauthenticated connection dropped");
            return;
        }
        if !registry.is_member(conn, conversation_id).await {
            tracing::debug!(
                connection = %conn,
                conversation = %conversation_id,
                "typing from non-member dropped"
            );
            return;
        }
        match serde_json::to_string(&ServerEvent::Typing { counterpart_id }) {
            Ok(frame) => {
                registry
                    .broadcast_except(conversation_id, conn, &frame)
                    .await;
            }
            Err(e) => tracing::error!(error = %e, "failed to encode typing frame"),
        }
    }

    /// Persist a message, then relay it to every member of the room, the
    /// sender's connections included. When persistence fails the relay is
    /// skipped entirely; a message is never delivered before it is accepted.
    pub async fn on_message(
        registry: &ConnectionRegistry,
        messages: &dyn MessageStore,
        conn: ConnectionId,
        conversation_id: Uuid,
        sender_id: Uuid,
        body: &str,
    ) {
        if registry.principal_of(conn).await.is_none() {
            tracing::debug!(connection = %conn, "message from unauthenticated connection dropped");
            return;
        }

        let stored = match messages.append(conversation_id, sender_id, body).await {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(
                    connection = %conn,
                    conversation = %conversation_id,
                    error = %e,
                    "message persistence failed, not relaying"
                );
                return;
            }
        };

        match serde_json::to_string(&ServerEvent::Message {
            body: stored.body,
            sender_id: stored.sender_id,
        }) {
            Ok(frame) => {
                let delivered = registry.broadcast(conversation_id, &frame).await;
                tracing::debug!(conversation = %conversation_id, delivered, "message relayed");
            }
            Err(e) => tracing::error!(error = %e, "failed to encode message frame"),
        }
    }
}
