//! Conversation entity and repository trait.
//!
//! Maps to the `conversations` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ParticipantPair;
use crate::shared::error::AppError;

/// The single conversation record of an unordered pair of users.
///
/// Maps to the `conversations` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - user1_id: BIGINT NOT NULL (lower participant id)
/// - user2_id: BIGINT NOT NULL (higher participant id)
/// - last_message_id: BIGINT NULL REFERENCES messages(id)
/// - last_message_at: TIMESTAMPTZ NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - UNIQUE (user1_id, user2_id), CHECK (user1_id < user2_id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub user1_id: i64,
    pub user2_id: i64,
    pub last_message_id: Option<i64>,
    /// Denormalized from the last message so lists sort without a join.
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn pair(&self) -> ParticipantPair {
        ParticipantPair::new(self.user1_id, self.user2_id)
    }

    /// ID of the participant that is not `user_id`.
    ///
    /// Falls back to `user1_id` when `user_id` is not a participant.
    pub fn other_user_id(&self, user_id: i64) -> i64 {
        self.pair().other(user_id).unwrap_or(self.user1_id)
    }
}

/// A conversation together with the text of its last message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationPreview {
    pub conversation: Conversation,
    pub last_message: Option<String>,
}

/// Repository trait for Conversation data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Fetch the conversation of the pair, creating it on first use.
    ///
    /// Must be safe under concurrent callers: two racing calls for the same
    /// pair return the same row.
    async fn get_or_create(&self, pair: ParticipantPair) -> Result<Conversation, AppError>;

    /// All conversations involving the user, most recent message first.
    /// Conversations without messages come last.
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<ConversationPreview>, AppError>;

    /// Point the conversation at a newer message.
    ///
    /// An update whose `at` is older than the stored `last_message_at` is
    /// ignored so the pointer never moves backwards.
    async fn update_last_message(
        &self,
        conversation_id: i64,
        message_id: i64,
        at: DateTime<Utc>,
    ) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_user_id() {
        let conv = Conversation {
            id: 1,
            user1_id: 3,
            user2_id: 8,
            last_message_id: None,
            last_message_at: None,
            created_at: Utc::now(),
        };
        assert_eq!(conv.other_user_id(3), 8);
        assert_eq!(conv.other_user_id(8), 3);
        assert_eq!(conv.pair(), ParticipantPair::new(8, 3));
        assert_eq!(conv.other_user_id(5), 3);
    }
}
