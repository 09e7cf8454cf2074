use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Profile;

/// Frames a client sends over the socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// In-band sign-in; carries the same token the HTTP login issues.
    #[serde(rename = "authenticate")]
    Authenticate { token: String },

    #[serde(rename = "typing", rename_all = "camelCase")]
    Typing {
        conversation_id: Uuid,
        counterpart_id: Uuid,
    },

    #[serde(rename = "message", rename_all = "camelCase")]
    Message {
        conversation_id: Uuid,
        sender_id: Uuid,
        body: String,
    },
}

/// Frames the service pushes to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "authenticated")]
    Authenticated { principal: Profile },

    #[serde(rename = "typing", rename_all = "camelCase")]
    Typing { counterpart_id: Uuid },

    #[serde(rename = "message", rename_all = "camelCase")]
    Message { body: String, sender_id: Uuid },
}
