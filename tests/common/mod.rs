//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use std::sync::Arc;

use axum_test::TestServer;
use jsonwebtoken::{encode, EncodingKey, Header};

use hollow_server::config::{
    ChatSettings, CorsSettings, DatabaseSettings, JwtSettings, ServerSettings, Settings,
    WebSocketSettings,
};
use hollow_server::domain::UserSummary;
use hollow_server::infrastructure::repositories::InMemoryChatStore;
use hollow_server::presentation::middleware::Claims;
use hollow_server::startup::{build_router, AppState};

pub const ALICE: i64 = 1;
pub const BOB: i64 = 2;
pub const CAROL: i64 = 3;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";

/// Settings that never touch the network
pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseSettings {
            url: "postgres://unused".into(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout: 1,
            run_migrations: false,
        },
        jwt: JwtSettings {
            secret: JWT_SECRET.into(),
        },
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        websocket: WebSocketSettings::default(),
        chat: ChatSettings::default(),
        environment: "test".into(),
    }
}

/// Test application over the in-memory store
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

impl TestApp {
    /// Alice, Bob and Carol exist; nobody is connected.
    pub fn new() -> Self {
        let store = Arc::new(InMemoryChatStore::with_users([
            user(ALICE, "alice"),
            user(BOB, "bob"),
            user(CAROL, "carol"),
        ]));
        let state = AppState::with_memory_store(Arc::new(test_settings()), store);
        let server = TestServer::new(build_router(state.clone())).expect("test server");
        Self { server, state }
    }

    /// A valid token for the user
    pub fn token(&self, user_id: i64) -> String {
        issue_token(user_id, 3600)
    }
}

pub fn user(id: i64, nickname: &str) -> UserSummary {
    UserSummary {
        id,
        nickname: nickname.into(),
        avatar_url: None,
    }
}

/// Sign a token the way the account service does
pub fn issue_token(user_id: i64, ttl_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        user_id,
        email: format!("user{user_id}@example.com"),
        exp: now + ttl_secs,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("token")
}
