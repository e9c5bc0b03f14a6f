//! Chat Service
//!
//! Transport-agnostic rules for direct messages: sending, history, read
//! state and conversation lists. Nothing here knows whether a result is ever
//! delivered over a live connection.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    Conversation, ConversationRepository, Message, MessageRepository, NewMessage, PageRequest,
    ParticipantPair, UserRepository, UserSummary,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Chat service trait
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Store a message from `sender_id` to `receiver_id`.
    ///
    /// Fails only if validation fails or the message itself cannot be
    /// written. Conversation bookkeeping after the write is best effort.
    async fn send_message(
        &self,
        sender_id: i64,
        receiver_id: i64,
        content: &str,
    ) -> Result<Message, ChatError>;

    /// Messages between two users in either direction, newest first.
    async fn get_messages(
        &self,
        user_id: i64,
        peer_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Message>, ChatError>;

    /// Conversation list of a user, most recent activity first.
    async fn get_conversations(&self, user_id: i64) -> Result<Vec<ConversationSummary>, ChatError>;

    /// The canonical conversation of the pair, created on first use.
    async fn get_or_create_conversation(
        &self,
        user_a: i64,
        user_b: i64,
    ) -> Result<Conversation, ChatError>;

    /// Mark one message read on behalf of `user_id`.
    async fn mark_as_read(&self, message_id: i64, user_id: i64) -> Result<ReadOutcome, ChatError>;

    /// Mark every unread message from `peer_id` to `user_id` as read.
    async fn mark_conversation_as_read(&self, user_id: i64, peer_id: i64) -> Result<u64, ChatError>;

    /// Total unread messages addressed to the user.
    async fn get_unread_count(&self, user_id: i64) -> Result<i64, ChatError>;
}

/// One row of a user's conversation list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSummary {
    pub id: i64,
    pub other_user: UserSummary,
    /// Empty when the conversation has no message yet.
    pub last_message: String,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: i64,
}

/// Result of a mark-read request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// This call set the read timestamp.
    Marked(Message),
    /// The message was already read; nothing changed.
    AlreadyRead,
    /// Unknown message or the caller is not its receiver; nothing changed.
    Ignored,
}

/// Chat service errors
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message content cannot be empty")]
    EmptyContent,

    #[error("message content exceeds {max} characters")]
    ContentTooLong { max: usize },

    #[error("invalid recipient")]
    InvalidRecipient,

    #[error("recipient not found")]
    RecipientNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppError> for ChatError {
    fn from(e: AppError) -> Self {
        ChatError::Internal(e.to_string())
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::EmptyContent | ChatError::ContentTooLong { .. } | ChatError::InvalidRecipient => {
                AppError::Validation(e.to_string())
            }
            ChatError::RecipientNotFound => AppError::NotFound("Recipient not found".into()),
            ChatError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// ChatService implementation
pub struct ChatServiceImpl<M, C, U>
where
    M: MessageRepository,
    C: ConversationRepository,
    U: UserRepository,
{
    message_repo: Arc<M>,
    conversation_repo: Arc<C>,
    user_repo: Arc<U>,
    max_content_length: usize,
}

impl<M, C, U> ChatServiceImpl<M, C, U>
where
    M: MessageRepository,
    C: ConversationRepository,
    U: UserRepository,
{
    pub fn new(
        message_repo: Arc<M>,
        conversation_repo: Arc<C>,
        user_repo: Arc<U>,
        max_content_length: usize,
    ) -> Self {
        Self {
            message_repo,
            conversation_repo,
            user_repo,
            max_content_length,
        }
    }

    fn validate_send(&self, sender_id: i64, receiver_id: i64, content: &str) -> Result<(), ChatError> {
        if receiver_id <= 0 || receiver_id == sender_id {
            return Err(ChatError::InvalidRecipient);
        }
        if content.trim().is_empty() {
            return Err(ChatError::EmptyContent);
        }
        if content.chars().count() > self.max_content_length {
            return Err(ChatError::ContentTooLong {
                max: self.max_content_length,
            });
        }
        Ok(())
    }

    /// Move the pair's conversation pointer to `message`.
    async fn touch_conversation(&self, message: &Message) -> Result<(), AppError> {
        let conversation = self
            .conversation_repo
            .get_or_create(message.participants())
            .await?;
        self.conversation_repo
            .update_last_message(conversation.id, message.id, message.created_at)
            .await
    }
}

#[async_trait]
impl<M, C, U> ChatService for ChatServiceImpl<M, C, U>
where
    M: MessageRepository + 'static,
    C: ConversationRepository + 'static,
    U: UserRepository + 'static,
{
    async fn send_message(
        &self,
        sender_id: i64,
        receiver_id: i64,
        content: &str,
    ) -> Result<Message, ChatError> {
        self.validate_send(sender_id, receiver_id, content)?;

        if !self.user_repo.exists(receiver_id).await? {
            return Err(ChatError::RecipientNotFound);
        }

        let message = self
            .message_repo
            .create(&NewMessage {
                sender_id,
                receiver_id,
                content: content.to_string(),
                created_at: Utc::now(),
            })
            .await?;
        metrics::record_message_persisted();

        // The message is committed; a stale pointer is repaired by the next send.
        if let Err(e) = self.touch_conversation(&message).await {
            metrics::record_conversation_pointer_failure();
            tracing::warn!(
                message_id = message.id,
                pair = %message.participants(),
                error = %e,
                "Failed to update conversation pointer"
            );
        }

        tracing::debug!(message_id = message.id, sender_id, receiver_id, "Message stored");
        Ok(message)
    }

    async fn get_messages(
        &self,
        user_id: i64,
        peer_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Message>, ChatError> {
        let messages = self
            .message_repo
            .find_between(ParticipantPair::new(user_id, peer_id), page)
            .await?;
        Ok(messages)
    }

    async fn get_conversations(&self, user_id: i64) -> Result<Vec<ConversationSummary>, ChatError> {
        let previews = self.conversation_repo.find_by_user(user_id).await?;
        if previews.is_empty() {
            return Ok(Vec::new());
        }

        let peer_ids: Vec<i64> = previews
            .iter()
            .map(|p| p.conversation.other_user_id(user_id))
            .collect();
        let users = self.user_repo.find_summaries(&peer_ids).await?;
        let unread = self.message_repo.count_unread_by_sender(user_id).await?;

        Ok(previews
            .into_iter()
            .map(|preview| {
                let peer_id = preview.conversation.other_user_id(user_id);
                ConversationSummary {
                    id: preview.conversation.id,
                    other_user: users
                        .get(&peer_id)
                        .cloned()
                        .unwrap_or_else(|| UserSummary::unknown(peer_id)),
                    last_message: preview.last_message.unwrap_or_default(),
                    last_message_at: preview.conversation.last_message_at,
                    unread_count: unread.get(&peer_id).copied().unwrap_or(0),
                }
            })
            .collect())
    }

    async fn get_or_create_conversation(
        &self,
        user_a: i64,
        user_b: i64,
    ) -> Result<Conversation, ChatError> {
        let conversation = self
            .conversation_repo
            .get_or_create(ParticipantPair::new(user_a, user_b))
            .await?;
        Ok(conversation)
    }

    async fn mark_as_read(&self, message_id: i64, user_id: i64) -> Result<ReadOutcome, ChatError> {
        let Some(message) = self.message_repo.find_by_id(message_id).await? else {
            return Ok(ReadOutcome::Ignored);
        };

        // Senders' clients may optimistically acknowledge their own copy.
        if message.receiver_id != user_id {
            return Ok(ReadOutcome::Ignored);
        }
        if message.is_read() {
            return Ok(ReadOutcome::AlreadyRead);
        }

        match self.message_repo.mark_read(message_id, user_id, Utc::now()).await? {
            Some(updated) => Ok(ReadOutcome::Marked(updated)),
            None => Ok(ReadOutcome::AlreadyRead),
        }
    }

    async fn mark_conversation_as_read(&self, user_id: i64, peer_id: i64) -> Result<u64, ChatError> {
        let updated = self
            .message_repo
            .mark_all_read(peer_id, user_id, Utc::now())
            .await?;
        Ok(updated)
    }

    async fn get_unread_count(&self, user_id: i64) -> Result<i64, ChatError> {
        Ok(self.message_repo.count_unread(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        MockConversationRepository, MockMessageRepository, MockUserRepository,
    };
    use crate::infrastructure::repositories::InMemoryChatStore;
    use pretty_assertions::assert_eq;

    const ALICE: i64 = 1;
    const BOB: i64 = 2;
    const CAROL: i64 = 3;

    fn user(id: i64, nickname: &str) -> UserSummary {
        UserSummary {
            id,
            nickname: nickname.into(),
            avatar_url: None,
        }
    }

    type MemoryChat = ChatServiceImpl<InMemoryChatStore, InMemoryChatStore, InMemoryChatStore>;

    fn service() -> MemoryChat {
        let store = Arc::new(InMemoryChatStore::with_users([
            user(ALICE, "alice"),
            user(BOB, "bob"),
            user(CAROL, "carol"),
        ]));
        ChatServiceImpl::new(store.clone(), store.clone(), store, 4000)
    }

    #[tokio::test]
    async fn test_sent_message_is_listed_for_both_orders() {
        let chat = service();
        let sent = chat.send_message(ALICE, BOB, "hello bob").await.unwrap();

        let forward = chat.get_messages(ALICE, BOB, PageRequest::new(Some(1), Some(50))).await.unwrap();
        let backward = chat.get_messages(BOB, ALICE, PageRequest::new(Some(1), Some(50))).await.unwrap();

        assert_eq!(forward, vec![sent.clone()]);
        assert_eq!(forward, backward);
        assert_eq!(forward[0].content, "hello bob");
    }

    #[tokio::test]
    async fn test_history_is_newest_first_across_directions() {
        let chat = service();
        chat.send_message(ALICE, BOB, "one").await.unwrap();
        chat.send_message(BOB, ALICE, "two").await.unwrap();
        chat.send_message(ALICE, CAROL, "elsewhere").await.unwrap();
        chat.send_message(ALICE, BOB, "three").await.unwrap();

        let history = chat.get_messages(BOB, ALICE, PageRequest::default()).await.unwrap();
        let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["three", "two", "one"]);
    }

    #[tokio::test]
    async fn test_validation_rejects_before_persisting() {
        let chat = service();
        assert!(matches!(
            chat.send_message(ALICE, BOB, "   ").await,
            Err(ChatError::EmptyContent)
        ));
        assert!(matches!(
            chat.send_message(ALICE, ALICE, "me").await,
            Err(ChatError::InvalidRecipient)
        ));
        assert!(matches!(
            chat.send_message(ALICE, 0, "nobody").await,
            Err(ChatError::InvalidRecipient)
        ));
        assert!(matches!(
            chat.send_message(ALICE, 99, "ghost").await,
            Err(ChatError::RecipientNotFound)
        ));

        let long = "x".repeat(4001);
        assert!(matches!(
            chat.send_message(ALICE, BOB, &long).await,
            Err(ChatError::ContentTooLong { max: 4000 })
        ));

        assert!(chat.get_messages(ALICE, BOB, PageRequest::default()).await.unwrap().is_empty());
        assert_eq!(chat.get_unread_count(BOB).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_conversation_is_canonical() {
        let chat = service();
        let ab = chat.get_or_create_conversation(ALICE, BOB).await.unwrap();
        let ba = chat.get_or_create_conversation(BOB, ALICE).await.unwrap();
        let again = chat.get_or_create_conversation(ALICE, BOB).await.unwrap();

        assert_eq!(ab.id, ba.id);
        assert_eq!(ab.id, again.id);
        assert_eq!((ab.user1_id, ab.user2_id), (ALICE, BOB));
    }

    #[tokio::test]
    async fn test_sends_in_both_directions_share_one_conversation() {
        let store = Arc::new(InMemoryChatStore::with_users([user(ALICE, "alice"), user(BOB, "bob")]));
        let chat = ChatServiceImpl::new(store.clone(), store.clone(), store.clone(), 4000);

        chat.send_message(ALICE, BOB, "ping").await.unwrap();
        chat.send_message(BOB, ALICE, "pong").await.unwrap();

        assert_eq!(store.conversation_count(), 1);
        let list = chat.get_conversations(ALICE).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].last_message, "pong");
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent() {
        let chat = service();
        let msg = chat.send_message(ALICE, BOB, "read me").await.unwrap();

        let first = chat.mark_as_read(msg.id, BOB).await.unwrap();
        let read_at = match first {
            ReadOutcome::Marked(m) => m.read_at.unwrap(),
            other => panic!("expected Marked, got {other:?}"),
        };

        assert_eq!(chat.mark_as_read(msg.id, BOB).await.unwrap(), ReadOutcome::AlreadyRead);

        let history = chat.get_messages(ALICE, BOB, PageRequest::default()).await.unwrap();
        assert_eq!(history[0].read_at, Some(read_at));
    }

    #[tokio::test]
    async fn test_mark_read_by_sender_is_ignored() {
        let chat = service();
        let msg = chat.send_message(ALICE, BOB, "mine").await.unwrap();

        assert_eq!(chat.mark_as_read(msg.id, ALICE).await.unwrap(), ReadOutcome::Ignored);
        assert_eq!(chat.mark_as_read(msg.id, CAROL).await.unwrap(), ReadOutcome::Ignored);
        assert_eq!(chat.mark_as_read(9999, BOB).await.unwrap(), ReadOutcome::Ignored);

        let history = chat.get_messages(ALICE, BOB, PageRequest::default()).await.unwrap();
        assert!(history[0].read_at.is_none());
        assert_eq!(chat.get_unread_count(BOB).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_offline_recipient_flow() {
        let chat = service();
        chat.send_message(ALICE, BOB, "hi").await.unwrap();

        let list = chat.get_conversations(BOB).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].other_user, user(ALICE, "alice"));
        assert_eq!(list[0].last_message, "hi");
        assert_eq!(list[0].unread_count, 1);

        let history = chat.get_messages(BOB, ALICE, PageRequest::default()).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(chat.mark_conversation_as_read(BOB, ALICE).await.unwrap(), 1);
        assert_eq!(chat.get_unread_count(BOB).await.unwrap(), 0);

        let list = chat.get_conversations(BOB).await.unwrap();
        assert_eq!(list[0].unread_count, 0);
    }

    #[tokio::test]
    async fn test_conversations_ordered_by_last_message() {
        let chat = service();
        chat.get_or_create_conversation(ALICE, CAROL).await.unwrap();
        chat.send_message(BOB, ALICE, "first").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        chat.send_message(ALICE, CAROL, "second").await.unwrap();

        let list = chat.get_conversations(ALICE).await.unwrap();
        let peers: Vec<_> = list.iter().map(|c| c.other_user.id).collect();
        assert_eq!(peers, vec![CAROL, BOB]);
        // Bob's message is unread for Alice; Alice wrote the latest to Carol.
        assert_eq!(list[1].unread_count, 1);
        assert_eq!(list[0].unread_count, 0);
    }

    #[tokio::test]
    async fn test_empty_conversation_is_listed_last_with_blank_text() {
        let chat = service();
        chat.send_message(ALICE, BOB, "hey").await.unwrap();
        chat.get_or_create_conversation(CAROL, ALICE).await.unwrap();

        let list = chat.get_conversations(ALICE).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].other_user.id, CAROL);
        assert_eq!(list[1].last_message, "");
        assert!(list[1].last_message_at.is_none());
    }

    #[tokio::test]
    async fn test_pointer_failure_still_reports_success() {
        let mut messages = MockMessageRepository::new();
        messages.expect_create().times(1).returning(|new| {
            Ok(Message {
                id: 42,
                sender_id: new.sender_id,
                receiver_id: new.receiver_id,
                content: new.content.clone(),
                created_at: new.created_at,
                read_at: None,
            })
        });

        let mut conversations = MockConversationRepository::new();
        conversations
            .expect_get_or_create()
            .times(1)
            .returning(|_| Err(AppError::Internal("deadlock detected".into())));
        conversations.expect_update_last_message().never();

        let mut users = MockUserRepository::new();
        users.expect_exists().returning(|_| Ok(true));

        let chat = ChatServiceImpl::new(Arc::new(messages), Arc::new(conversations), Arc::new(users), 4000);
        let sent = chat.send_message(ALICE, BOB, "still here").await.unwrap();
        assert_eq!(sent.id, 42);
    }

    #[tokio::test]
    async fn test_message_write_failure_fails_send() {
        let mut messages = MockMessageRepository::new();
        messages
            .expect_create()
            .returning(|_| Err(AppError::Internal("disk full".into())));

        let mut conversations = MockConversationRepository::new();
        conversations.expect_get_or_create().never();

        let mut users = MockUserRepository::new();
        users.expect_exists().returning(|_| Ok(true));

        let chat = ChatServiceImpl::new(Arc::new(messages), Arc::new(conversations), Arc::new(users), 4000);
        assert!(matches!(
            chat.send_message(ALICE, BOB, "lost").await,
            Err(ChatError::Internal(_))
        ));
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(AppError::from(ChatError::EmptyContent), AppError::Validation(_)));
        assert!(matches!(AppError::from(ChatError::RecipientNotFound), AppError::NotFound(_)));
        assert!(matches!(
            AppError::from(ChatError::Internal("x".into())),
            AppError::Internal(_)
        ));
    }
}
