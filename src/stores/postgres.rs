use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Conversation, Message, NewPrincipal, Principal, Role, SupportRequest};

use super::{ConversationStore, MessageStore, PrincipalStore, SupportStore};

pub struct PgPrincipalStore {
    pool: Pool<Postgres>,
}

impl PgPrincipalStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PgPrincipalStore { pool }
    }
}

#[async_trait]
impl PrincipalStore for PgPrincipalStore {
    async fn find_by_email(
        &self,
        email: &str,
        role: Option<Role>,
    ) -> AppResult<Option<Principal>> {
        let principal = match role {
            Some(role) => {
                sqlx::query_as::<_, Principal>("SELECT * FROM users WHERE email = $1 AND role = $2")
                    .bind(email)
                    .bind(role)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as::<_, Principal>("SELECT * FROM users WHERE email = $1")
                    .bind(email)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(principal)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Principal>> {
        let principal = sqlx::query_as::<_, Principal>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(principal)
    }

    async fn insert(&self, new: NewPrincipal) -> AppResult<Principal> {
        let result = sqlx::query_as::<_, Principal>(
            "INSERT INTO users (id, name, email, password_hash, salt, role) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.salt)
        .bind(new.role)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(principal) => Ok(principal),
            Err(e) if is_unique_violation(&e) => Err(AppError::Conflict),
            Err(e) => Err(e.into()),
        }
    }
}

pub struct PgConversationStore {
    pool: Pool<Postgres>,
}

impl PgConversationStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PgConversationStore { pool }
    }
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn conversations_of(&self, principal_id: Uuid) -> AppResult<Vec<Conversation>> {
        let rows = sqlx::query_as::<_, Conversation>(
            "SELECT * FROM conversations WHERE buyer_id = $1 OR seller_id = $1 \
             ORDER BY created_at DESC",
        )
        .bind(principal_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        let conversation =
            sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(conversation)
    }
}

pub struct PgMessageStore {
    pool: Pool<Postgres>,
}

impl PgMessageStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PgMessageStore { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn append(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        body: &str,
    ) -> AppResult<Message> {
        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO messages (id, conversation_id, sender_id, body) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(conversation_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(message)
    }

    async fn list(&self, conversation_id: Uuid) -> AppResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE conversation_id = $1 ORDER BY created_at ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

pub struct PgSupportStore {
    pool: Pool<Postgres>,
}

impl PgSupportStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PgSupportStore { pool }
    }
}

#[async_trait]
impl SupportStore for PgSupportStore {
    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<SupportRequest>> {
        let rows = sqlx::query_as::<_, SupportRequest>(
            "SELECT * FROM support_requests ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM support_requests")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<SupportRequest>> {
        let request =
            sqlx::query_as::<_, SupportRequest>("SELECT * FROM support_requests WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(request)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}
