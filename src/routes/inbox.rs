use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult, AuthError};
use crate::models::{Conversation, Profile, PublicProfile};
use crate::state::AppState;

/// A conversation with both parties embedded, push tokens and credentials
/// stripped.
#[derive(Debug, Serialize)]
struct ChatSummary {
    #[serde(flatten)]
    conversation: Conversation,
    buyer: PublicProfile,
    seller: PublicProfile,
}

/// `GET /api/v1/inbox/chats`: every conversation the caller participates in.
pub async fn chats(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
) -> AppResult<Json<Value>> {
    let conversations = state.conversations.conversations_of(profile.id).await?;
    let mut chats = Vec::with_capacity(conversations.len());
    for conversation in conversations {
        let buyer = load_public(&state, conversation.buyer_id).await?;
        let seller = load_public(&state, conversation.seller_id).await?;
        chats.push(ChatSummary {
            conversation,
            buyer,
            seller,
        });
    }
    Ok(Json(json!({ "ok": true, "chats": chats })))
}

/// `GET /api/v1/inbox/:id`: one conversation with its messages, oldest first.
/// Participants only.
pub async fn chat(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let conversation = state
        .conversations
        .find(id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !conversation.has_participant(profile.id) {
        return Err(AuthError::Forbidden.into());
    }
    let messages = state.messages.list(conversation.id).await?;
    Ok(Json(
        json!({ "ok": true, "chat": conversation, "messages": messages }),
    ))
}

async fn load_public(state: &AppState, id: Uuid) -> AppResult<PublicProfile> {
    state
        .principals
        .find_by_id(id)
        .await?
        .map(|p| p.public())
        .ok_or_else(|| AppError::Internal(format!("conversation references missing user {}", id)))
}
