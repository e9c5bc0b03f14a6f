//! WebSocket Message Types
//!
//! JSON text frames exchanged with chat clients. Every frame carries a
//! `type` field.

use serde::{Deserialize, Serialize};

use crate::domain::Message;

/// Incoming frame from a client
///
/// The sender is always the authenticated connection owner; a `from` field
/// sent by the client is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientEvent {
    /// Send a direct message
    Message { to: i64, content: String },
    /// Typing indicator, never stored
    Typing { to: i64 },
    /// Read receipt for a received message
    Read {
        message_id: i64,
        /// Accepted for compatibility; the receipt goes to the message's sender.
        #[serde(default)]
        to: Option<i64>,
    },
}

/// Outgoing frame kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Message,
    Typing,
    Read,
    Error,
}

/// Outgoing frame to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,
    /// Full stored message for `message` frames
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

impl ServerEvent {
    fn empty(kind: EventKind) -> Self {
        Self {
            kind,
            from: None,
            to: None,
            content: None,
            message_id: None,
            message: None,
        }
    }

    /// A stored message, sent to both participants.
    pub fn message(message: &Message) -> Self {
        Self {
            from: Some(message.sender_id),
            to: Some(message.receiver_id),
            content: Some(message.content.clone()),
            message_id: Some(message.id),
            message: Some(message.clone()),
            ..Self::empty(EventKind::Message)
        }
    }

    pub fn typing(from: i64, to: i64) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Self::empty(EventKind::Typing)
        }
    }

    /// Read receipt from `reader` to the message's `sender`.
    pub fn read(reader: i64, sender: i64, message_id: i64) -> Self {
        Self {
            from: Some(reader),
            to: Some(sender),
            message_id: Some(message_id),
            ..Self::empty(EventKind::Read)
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Self::empty(EventKind::Error)
        }
    }
}
