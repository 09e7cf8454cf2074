use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Conversation, Message, NewPrincipal, Principal, Role, SupportRequest};

mod memory;
mod postgres;

pub use memory::{
    MemoryConversationStore, MemoryMessageStore, MemoryPrincipalStore, MemorySupportStore,
};
pub use postgres::{PgConversationStore, PgMessageStore, PgPrincipalStore, PgSupportStore};

/// Lookup and creation of accounts.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Find by email, optionally requiring a role. A principal with the wrong
    /// role is reported as absent, not as forbidden.
    async fn find_by_email(&self, email: &str, role: Option<Role>)
        -> AppResult<Option<Principal>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Principal>>;

    /// Insert a new principal. Fails with [`crate::error::AppError::Conflict`]
    /// when the email is already taken.
    async fn insert(&self, new: NewPrincipal) -> AppResult<Principal>;
}

/// Read access to buyer/seller conversation threads.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// All conversations the principal participates in, newest first.
    async fn conversations_of(&self, principal_id: Uuid) -> AppResult<Vec<Conversation>>;

    async fn find(&self, id: Uuid) -> AppResult<Option<Conversation>>;
}

/// Persistence for chat messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a message and return the stored row.
    async fn append(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        body: &str,
    ) -> AppResult<Message>;

    /// Messages of a conversation, oldest first.
    async fn list(&self, conversation_id: Uuid) -> AppResult<Vec<Message>>;
}

/// Read access to support tickets, newest first.
#[async_trait]
pub trait SupportStore: Send + Sync {
    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<SupportRequest>>;

    async fn count(&self) -> AppResult<i64>;

    async fn find(&self, id: Uuid) -> AppResult<Option<SupportRequest>>;
}
