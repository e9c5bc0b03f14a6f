//! Message Repository Implementation
//!
//! PostgreSQL implementation of direct message storage: inserts, pair history
//! with offset pagination, and read-state updates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;

use crate::domain::{Message, MessageRepository, NewMessage, PageRequest, ParticipantPair};
use crate::shared::error::AppError;

/// PostgreSQL message repository implementation.
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Creates a new PgMessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    sender_id: i64,
    receiver_id: i64,
    content: String,
    created_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
}

impl MessageRow {
    fn into_message(self) -> Message {
        Message {
            id: self.id,
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            content: self.content,
            created_at: self.created_at,
            read_at: self.read_at,
        }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(&self, message: &NewMessage) -> Result<Message, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (sender_id, receiver_id, content, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, sender_id, receiver_id, content, created_at, read_at
            "#,
        )
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(&message.content)
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_message())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Message>, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, sender_id, receiver_id, content, created_at, read_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MessageRow::into_message))
    }

    /// Newest first. IDs are assigned in insertion order, so ordering by
    /// `id` is stable even when two messages share a timestamp.
    async fn find_between(
        &self,
        pair: ParticipantPair,
        page: PageRequest,
    ) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, sender_id, receiver_id, content, created_at, read_at
            FROM messages
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(pair.low())
        .bind(pair.high())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MessageRow::into_message).collect())
    }

    async fn mark_read(
        &self,
        id: i64,
        receiver_id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            UPDATE messages
            SET read_at = $3
            WHERE id = $1 AND receiver_id = $2 AND read_at IS NULL
            RETURNING id, sender_id, receiver_id, content, created_at, read_at
            "#,
        )
        .bind(id)
        .bind(receiver_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MessageRow::into_message))
    }

    async fn mark_all_read(
        &self,
        sender_id: i64,
        receiver_id: i64,
        at: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read_at = $3
            WHERE sender_id = $1 AND receiver_id = $2 AND read_at IS NULL
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_unread(&self, receiver_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND read_at IS NULL",
        )
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_unread_by_sender(&self, receiver_id: i64) -> Result<HashMap<i64, i64>, AppError> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT sender_id, COUNT(*)
            FROM messages
            WHERE receiver_id = $1 AND read_at IS NULL
            GROUP BY sender_id
            "#,
        )
        .bind(receiver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
