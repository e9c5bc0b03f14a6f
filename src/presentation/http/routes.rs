//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{auth_middleware, track_metrics};
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/chat", chat_routes(state.clone()))
        .nest("/ws", websocket_routes(state))
}

/// Direct message routes (protected)
fn chat_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/conversations", get(handlers::chat::get_conversations))
        .route(
            "/conversations/{user_id}/read",
            put(handlers::chat::mark_conversation_read),
        )
        .route("/messages", post(handlers::chat::send_message))
        // Shared segment name: a user ID for GET, a message ID under /read.
        .route("/messages/{id}", get(handlers::chat::get_messages))
        .route("/messages/{id}/read", put(handlers::chat::mark_message_read))
        .route("/unread-count", get(handlers::chat::get_unread_count))
        .route("/online/{user_id}", get(handlers::chat::get_online_status))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// WebSocket routes (protected; token may come from the query string)
fn websocket_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/chat", get(ws_handler))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
