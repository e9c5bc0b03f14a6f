//! WebSocket Connection Handler
//!
//! Upgrades an authenticated request and hands the socket to a session.

use axum::{
    extract::{ws::WebSocket, Extension, State, WebSocketUpgrade},
    response::Response,
};
use futures::StreamExt;

use super::session::{Session, SessionConfig};
use crate::presentation::middleware::AuthUser;
use crate::startup::AppState;

/// WebSocket upgrade handler
///
/// Runs behind the auth middleware, so the identity is settled before the
/// upgrade; browsers pass the token as `?token=`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Response {
    let limits = &state.settings.websocket;
    ws.max_message_size(limits.max_message_size)
        .max_frame_size(limits.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, auth_user.user_id, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, user_id: i64, state: AppState) {
    let (connection_id, outbound) = state.hub.register(user_id);
    tracing::info!(user_id, connection_id = %connection_id, "User connected");

    let (sink, stream) = socket.split();
    let config = SessionConfig::from(&state.settings.websocket);

    Session::new(user_id, connection_id, state.hub.clone(), state.chat.clone())
        .run(sink, stream, outbound, config)
        .await;
}
