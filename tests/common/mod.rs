#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use marketplace_service::config::Config;
use marketplace_service::models::{NewPrincipal, Role};
use marketplace_service::routes;
use marketplace_service::security::password;
use marketplace_service::state::AppState;
use marketplace_service::stores::{
    MemoryConversationStore, MemoryMessageStore, MemoryPrincipalStore, MemorySupportStore,
    PrincipalStore,
};
use marketplace_service::websocket::registry::ConnectionRegistry;

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A served instance over in-memory stores, plus the concrete store handles
/// and the registry for seeding and inspection.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub principals: Arc<MemoryPrincipalStore>,
    pub conversations: Arc<MemoryConversationStore>,
    pub messages: Arc<MemoryMessageStore>,
    pub support: Arc<MemorySupportStore>,
    pub registry: ConnectionRegistry,
}

fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: String::new(),
        token_secret: "integration-secret".to_string(),
        environment: "test".to_string(),
    }
}

pub async fn spawn_app() -> TestApp {
    let principals = Arc::new(MemoryPrincipalStore::new());
    let conversations = Arc::new(MemoryConversationStore::new());
    let messages = Arc::new(MemoryMessageStore::new());
    let support = Arc::new(MemorySupportStore::new());

    let state = AppState::with_stores(
        principals.clone(),
        conversations.clone(),
        messages.clone(),
        support.clone(),
        test_config(),
    );
    let registry = state.registry.clone();
    let router = routes::build_router(state);

    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
        principals,
        conversations,
        messages,
        support,
        registry,
    }
}

impl TestApp {
    pub fn api(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    pub async fn register(&self, name: &str, email: &str, pw: &str) -> Value {
        self.client
            .post(self.api("/users/register"))
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": pw,
                "passwordConfirmation": pw,
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    /// Register and log in; returns the principal id and the full
    /// `Basic <token>` header value.
    pub async fn signed_up_user(&self, name: &str, email: &str, pw: &str) -> (Uuid, String) {
        let body = self.register(name, email, pw).await;
        let uid: Uuid = body["uid"].as_str().unwrap().parse().unwrap();
        let login: Value = self
            .client
            .post(self.api("/users/login"))
            .json(&serde_json::json!({ "email": email, "password": pw }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let authorization = login["authorization"].as_str().unwrap().to_string();
        (uid, authorization)
    }

    /// Insert an admin principal directly; admins cannot self-register.
    pub async fn seed_admin(&self, email: &str, pw: &str) -> Uuid {
        let (salt, hash) = password::new_credential(pw);
        self.principals
            .insert(NewPrincipal {
                name: "Root".to_string(),
                email: email.to_string(),
                password_hash: hash,
                salt,
                role: Role::Admin,
            })
            .await
            .unwrap()
            .id
    }

    pub async fn ws_connect(&self) -> WsClient {
        let ws_url = format!("{}/ws", self.base_url.replacen("http", "ws", 1));
        let (socket, _) = tokio_tungstenite::connect_async(ws_url).await.unwrap();
        socket
    }
}

/// Strip the header prefix; the realtime handshake carries the bare token.
pub fn bare_token(authorization: &str) -> &str {
    authorization.strip_prefix("Basic ").unwrap_or(authorization)
}

pub async fn ws_send(socket: &mut WsClient, payload: Value) {
    socket
        .send(WsMessage::Text(payload.to_string()))
        .await
        .unwrap();
}

/// Read the next text frame as JSON, failing after `millis`.
pub async fn recv_event(socket: &mut WsClient, millis: u64) -> Value {
    let frame = tokio::time::timeout(Duration::from_millis(millis), socket.next())
        .await
        .expect("timed out waiting for a frame")
        .expect("socket closed")
        .expect("socket error");
    match frame {
        WsMessage::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("expected a text frame, got {:?}", other),
    }
}

/// Assert no frame arrives within `millis`.
pub async fn assert_silent(socket: &mut WsClient, millis: u64) {
    let outcome = tokio::time::timeout(Duration::from_millis(millis), socket.next()).await;
    assert!(outcome.is_err(), "expected silence, got {:?}", outcome);
}
