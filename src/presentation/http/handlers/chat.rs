//! Chat Handlers
//!
//! REST access to direct messages for clients without a live socket. Sends
//! made here are routed to live connections exactly like socket sends.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::{
    DataResponse, MessageHistoryQuery, OnlineStatusResponse, SendMessageRequest, SuccessResponse,
    UnreadCountResponse,
};
use crate::application::services::{ConversationSummary, ReadOutcome};
use crate::domain::{Message, PageRequest};
use crate::presentation::middleware::AuthUser;
use crate::presentation::websocket::ServerEvent;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn parse_id(raw: &str, what: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid {what}")))
}

/// List the caller's conversations
pub async fn get_conversations(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<DataResponse<Vec<ConversationSummary>>>, AppError> {
    let conversations = state.chat.get_conversations(auth_user.user_id).await?;
    Ok(Json(DataResponse::new(conversations)))
}

/// Message history with another user, newest first
///
/// Viewing the history marks the peer's messages to the caller as read.
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Query(query): Query<MessageHistoryQuery>,
) -> Result<Json<DataResponse<Vec<Message>>>, AppError> {
    let peer_id = parse_id(&user_id, "user ID")?;
    let limits = &state.settings.chat;
    let page = PageRequest::with_limits(
        query.page,
        query.page_size,
        limits.default_page_size,
        limits.max_page_size,
    );

    let messages = state.chat.get_messages(auth_user.user_id, peer_id, page).await?;

    if let Err(e) = state
        .chat
        .mark_conversation_as_read(auth_user.user_id, peer_id)
        .await
    {
        tracing::warn!(user_id = auth_user.user_id, peer_id, error = %e, "Failed to mark conversation read");
    }

    Ok(Json(DataResponse::new(messages)))
}

/// Send a message
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<DataResponse<Message>>), AppError> {
    body.validate().map_err(validation_error)?;

    let message = state
        .chat
        .send_message(auth_user.user_id, body.receiver_id, &body.content)
        .await?;

    state.hub.deliver_message(&message);

    Ok((StatusCode::CREATED, Json(DataResponse::new(message))))
}

/// Mark one received message as read
pub async fn mark_message_read(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(message_id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    let message_id = parse_id(&message_id, "message ID")?;

    if let ReadOutcome::Marked(message) = state.chat.mark_as_read(message_id, auth_user.user_id).await? {
        state.hub.deliver(
            message.sender_id,
            &ServerEvent::read(auth_user.user_id, message.sender_id, message.id),
        );
    }

    Ok(Json(SuccessResponse::ok()))
}

/// Mark everything a peer sent to the caller as read
pub async fn mark_conversation_read(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    let peer_id = parse_id(&user_id, "user ID")?;
    let updated = state
        .chat
        .mark_conversation_as_read(auth_user.user_id, peer_id)
        .await?;
    Ok(Json(SuccessResponse::updated(updated)))
}

/// Total unread messages for the caller
pub async fn get_unread_count(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let count = state.chat.get_unread_count(auth_user.user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// Whether a user currently has a live connection
pub async fn get_online_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<OnlineStatusResponse>, AppError> {
    let user_id = parse_id(&user_id, "user ID")?;
    Ok(Json(OnlineStatusResponse {
        user_id,
        online: state.hub.is_online(user_id),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("17" => Some(17); "positive")]
    #[test_case("0" => None; "zero")]
    #[test_case("-3" => None; "negative")]
    #[test_case("abc" => None; "not a number")]
    fn test_parse_id(raw: &str) -> Option<i64> {
        parse_id(raw, "ID").ok()
    }
}
