use std::sync::Arc;

use sqlx::{Pool, Postgres};

use crate::config::Config;
use crate::security::token::SessionTokenCodec;
use crate::stores::{
    ConversationStore, MessageStore, PgConversationStore, PgMessageStore, PgPrincipalStore,
    PgSupportStore, PrincipalStore, SupportStore,
};
use crate::websocket::registry::ConnectionRegistry;

/// Shared handles injected into every handler and the websocket tasks.
#[derive(Clone)]
pub struct AppState {
    pub principals: Arc<dyn PrincipalStore>,
    pub conversations: Arc<dyn ConversationStore>,
    pub messages: Arc<dyn MessageStore>,
    pub support: Arc<dyn SupportStore>,
    pub registry: ConnectionRegistry,
    pub token_codec: Arc<SessionTokenCodec>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Production wiring over a Postgres pool.
    pub fn new(pool: Pool<Postgres>, config: Config) -> Self {
        Self::with_stores(
            Arc::new(PgPrincipalStore::new(pool.clone())),
            Arc::new(PgConversationStore::new(pool.clone())),
            Arc::new(PgMessageStore::new(pool.clone())),
            Arc::new(PgSupportStore::new(pool)),
            config,
        )
    }

    /// Wire explicit store implementations; the test harness passes the
    /// in-memory ones.
    pub fn with_stores(
        principals: Arc<dyn PrincipalStore>,
        conversations: Arc<dyn ConversationStore>,
        messages: Arc<dyn MessageStore>,
        support: Arc<dyn SupportStore>,
        config: Config,
    ) -> Self {
        let token_codec = Arc::new(SessionTokenCodec::new(config.token_secret.clone()));
        AppState {
            principals,
            conversations,
            messages,
            support,
            registry: ConnectionRegistry::new(),
            token_codec,
            config: Arc::new(config),
        }
    }
}
