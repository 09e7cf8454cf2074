use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Conversation, Message, NewPrincipal, Principal, Role, SupportRequest, SupportStatus,
};

use super::{ConversationStore, MessageStore, PrincipalStore, SupportStore};

/// Process-local [`PrincipalStore`]. Backs the test harness; the running
/// service wires the Postgres stores instead.
#[derive(Default)]
pub struct MemoryPrincipalStore {
    rows: RwLock<Vec<Principal>>,
}

impl MemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PrincipalStore for MemoryPrincipalStore {
    async fn find_by_email(
        &self,
        email: &str,
        role: Option<Role>,
    ) -> AppResult<Option<Principal>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .find(|p| p.email == email && role.map_or(true, |r| p.role == r))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Principal>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, new: NewPrincipal) -> AppResult<Principal> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|p| p.email == new.email) {
            return Err(AppError::Conflict);
        }
        let principal = Principal {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            salt: new.salt,
            role: new.role,
            device_token: None,
            created_at: Utc::now(),
        };
        rows.push(principal.clone());
        Ok(principal)
    }
}

#[derive(Default)]
pub struct MemoryConversationStore {
    rows: RwLock<Vec<Conversation>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a conversation between two principals.
    pub async fn seed(&self, buyer_id: Uuid, seller_id: Uuid) -> Conversation {
        let conversation = Conversation {
            id: Uuid::new_v4(),
            buyer_id,
            seller_id,
            listing_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        self.rows.write().await.push(conversation.clone());
        conversation
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn conversations_of(&self, principal_id: Uuid) -> AppResult<Vec<Conversation>> {
        let rows = self.rows.read().await;
        let mut found: Vec<Conversation> = rows
            .iter()
            .filter(|c| c.has_participant(principal_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        Ok(self.rows.read().await.iter().find(|c| c.id == id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryMessageStore {
    rows: RwLock<Vec<Message>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored messages in `conversation_id`.
    pub async fn count_for(&self, conversation_id: Uuid) -> usize {
        self.rows
            .read()
            .await
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .count()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn append(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        body: &str,
    ) -> AppResult<Message> {
        let message = Message {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id,
            body: body.to_string(),
            created_at: Utc::now(),
        };
        self.rows.write().await.push(message.clone());
        Ok(message)
    }

    async fn list(&self, conversation_id: Uuid) -> AppResult<Vec<Message>> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemorySupportStore {
    rows: RwLock<Vec<SupportRequest>>,
}

impl MemorySupportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a pending ticket filed by `user_id`.
    pub async fn seed(&self, user_id: Uuid, subject: &str, message: &str) -> SupportRequest {
        let request = SupportRequest {
            id: Uuid::new_v4(),
            user_id,
            subject: subject.to_string(),
            message: message.to_string(),
            status: SupportStatus::Pending,
            created_at: Utc::now(),
        };
        self.rows.write().await.push(request.clone());
        request
    }
}

#[async_trait]
impl SupportStore for MemorySupportStore {
    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<SupportRequest>> {
        let rows = self.rows.read().await;
        let mut sorted: Vec<SupportRequest> = rows.iter().cloned().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sorted
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.rows.read().await.len() as i64)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<SupportRequest>> {
        Ok(self.rows.read().await.iter().find(|r| r.id == id).cloned())
    }
}
