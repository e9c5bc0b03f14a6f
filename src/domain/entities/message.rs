//! Direct message entity and repository trait.
//!
//! Maps to the `messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::value_objects::{PageRequest, ParticipantPair};
use crate::shared::error::AppError;

/// A single directed message from one user to another.
///
/// Maps to the `messages` table:
/// - id: BIGSERIAL PRIMARY KEY (assigned by the store, increasing)
/// - sender_id: BIGINT NOT NULL
/// - receiver_id: BIGINT NOT NULL
/// - content: TEXT NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - read_at: TIMESTAMPTZ NULL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Set once by the receiver; never cleared or moved.
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    /// Record the first read. Later calls leave the timestamp untouched.
    ///
    /// Returns `true` if this call set `read_at`.
    pub fn mark_read(&mut self, at: DateTime<Utc>) -> bool {
        if self.read_at.is_some() {
            return false;
        }
        self.read_at = Some(at);
        true
    }

    pub fn participants(&self) -> ParticipantPair {
        ParticipantPair::new(self.sender_id, self.receiver_id)
    }
}

/// Insert payload for a message; the store assigns `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for Message data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new message and return it with its assigned ID.
    async fn create(&self, message: &NewMessage) -> Result<Message, AppError>;

    /// Find a message by ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Message>, AppError>;

    /// Messages in either direction between the pair, newest first.
    async fn find_between(
        &self,
        pair: ParticipantPair,
        page: PageRequest,
    ) -> Result<Vec<Message>, AppError>;

    /// Set `read_at` if the message is addressed to `receiver_id` and unread.
    ///
    /// Returns the updated message, or `None` when nothing changed.
    async fn mark_read(
        &self,
        id: i64,
        receiver_id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, AppError>;

    /// Mark every unread message from `sender_id` to `receiver_id` as read.
    ///
    /// Returns the number of messages updated.
    async fn mark_all_read(
        &self,
        sender_id: i64,
        receiver_id: i64,
        at: DateTime<Utc>,
    ) -> Result<u64, AppError>;

    /// Total unread messages addressed to the user.
    async fn count_unread(&self, receiver_id: i64) -> Result<i64, AppError>;

    /// Unread messages addressed to the user, grouped by sender.
    async fn count_unread_by_sender(&self, receiver_id: i64) -> Result<HashMap<i64, i64>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn message() -> Message {
        Message {
            id: 1,
            sender_id: 10,
            receiver_id: 20,
            content: "hi".into(),
            created_at: Utc::now(),
            read_at: None,
        }
    }

    #[test]
    fn test_mark_read_sets_once() {
        let mut msg = message();
        let first = Utc::now();
        assert!(msg.mark_read(first));
        assert!(!msg.mark_read(first + Duration::seconds(5)));
        assert_eq!(msg.read_at, Some(first));
        assert!(msg.is_read());
    }

    #[test]
    fn test_participants_canonical() {
        let msg = message();
        assert_eq!(msg.participants(), ParticipantPair::new(20, 10));
    }
}
