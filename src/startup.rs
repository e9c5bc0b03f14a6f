//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;

use crate::application::services::{ChatService, ChatServiceImpl};
use crate::config::Settings;
use crate::infrastructure::database;
use crate::infrastructure::repositories::{
    InMemoryChatStore, PgConversationRepository, PgMessageRepository, PgUserRepository,
};
use crate::presentation::http::{create_router, handlers::health};
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::Hub;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<dyn ChatService>,
    pub hub: Arc<Hub>,
    pub settings: Arc<Settings>,
    /// Present when backed by PostgreSQL; used by the readiness probe.
    pub db: Option<PgPool>,
}

impl AppState {
    /// State backed by PostgreSQL repositories.
    pub fn with_postgres(settings: Arc<Settings>, db: PgPool) -> Self {
        let chat = ChatServiceImpl::new(
            Arc::new(PgMessageRepository::new(db.clone())),
            Arc::new(PgConversationRepository::new(db.clone())),
            Arc::new(PgUserRepository::new(db.clone())),
            settings.chat.max_content_length,
        );
        Self::assemble(settings, Arc::new(chat), Some(db))
    }

    /// State backed by a process-local store.
    pub fn with_memory_store(settings: Arc<Settings>, store: Arc<InMemoryChatStore>) -> Self {
        let chat = ChatServiceImpl::new(
            store.clone(),
            store.clone(),
            store,
            settings.chat.max_content_length,
        );
        Self::assemble(settings, Arc::new(chat), None)
    }

    fn assemble(settings: Arc<Settings>, chat: Arc<dyn ChatService>, db: Option<PgPool>) -> Self {
        Self {
            chat,
            hub: Arc::new(Hub::new(settings.websocket.send_buffer_size)),
            settings,
            db,
        }
    }
}

/// Router with every route and the outer middleware stack
pub fn build_router(state: AppState) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);
    create_router(state).layer(
        ServiceBuilder::new()
            .layer(logging::create_trace_layer())
            .layer(cors)
            .layer(CompressionLayer::new()),
    )
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        // Create database pool
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        if settings.database.run_migrations {
            database::run_migrations(&db).await?;
            tracing::info!("Database migrations applied");
        }

        // Bind to address
        let listener = TcpListener::bind(settings.server_addr()).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        let state = AppState::with_postgres(Arc::new(settings), db);
        let router = build_router(state);

        Ok(Self { listener, router })
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
