//! Conversation Repository Implementation
//!
//! PostgreSQL implementation of the per-pair conversation record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Conversation, ConversationPreview, ConversationRepository, ParticipantPair};
use crate::shared::error::AppError;

/// PostgreSQL conversation repository implementation.
///
/// Get-or-create relies on the `uq_conversations_users` unique constraint,
/// so concurrent first messages between the same pair converge on one row.
pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ConversationRow {
    id: i64,
    user1_id: i64,
    user2_id: i64,
    last_message_id: Option<i64>,
    last_message_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl ConversationRow {
    fn into_conversation(self) -> Conversation {
        Conversation {
            id: self.id,
            user1_id: self.user1_id,
            user2_id: self.user2_id,
            last_message_id: self.last_message_id,
            last_message_at: self.last_message_at,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ConversationPreviewRow {
    #[sqlx(flatten)]
    conversation: ConversationRow,
    last_message_content: Option<String>,
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    async fn get_or_create(&self, pair: ParticipantPair) -> Result<Conversation, AppError> {
        // The no-op DO UPDATE makes RETURNING yield the existing row on conflict.
        let row = sqlx::query_as::<_, ConversationRow>(
            r#"
            INSERT INTO conversations (user1_id, user2_id)
            VALUES ($1, $2)
            ON CONFLICT (user1_id, user2_id)
            DO UPDATE SET user1_id = EXCLUDED.user1_id
            RETURNING id, user1_id, user2_id, last_message_id, last_message_at, created_at
            "#,
        )
        .bind(pair.low())
        .bind(pair.high())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_conversation())
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<ConversationPreview>, AppError> {
        let rows = sqlx::query_as::<_, ConversationPreviewRow>(
            r#"
            SELECT c.id, c.user1_id, c.user2_id, c.last_message_id, c.last_message_at,
                   c.created_at, m.content AS last_message_content
            FROM conversations c
            LEFT JOIN messages m ON m.id = c.last_message_id
            WHERE c.user1_id = $1 OR c.user2_id = $1
            ORDER BY c.last_message_at DESC NULLS LAST, c.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ConversationPreview {
                conversation: row.conversation.into_conversation(),
                last_message: row.last_message_content,
            })
            .collect())
    }

    async fn update_last_message(
        &self,
        conversation_id: i64,
        message_id: i64,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE conversations
            SET last_message_id = $2, last_message_at = $3
            WHERE id = $1 AND (last_message_at IS NULL OR last_message_at <= $3)
            "#,
        )
        .bind(conversation_id)
        .bind(message_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(
                conversation_id,
                message_id,
                "Conversation already points at a newer message"
            );
        }

        Ok(())
    }
}
