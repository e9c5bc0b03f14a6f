//! In-Memory Chat Store
//!
//! A process-local implementation of the message, conversation and user
//! repositories. It follows the same contracts as the PostgreSQL
//! repositories (store-assigned increasing IDs, unique canonical pairs,
//! conditional read updates) and backs the test suite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

use crate::domain::{
    Conversation, ConversationPreview, ConversationRepository, Message, MessageRepository,
    NewMessage, PageRequest, ParticipantPair, UserRepository, UserSummary,
};
use crate::shared::error::AppError;

#[derive(Default)]
struct StoreState {
    messages: BTreeMap<i64, Message>,
    conversations: HashMap<ParticipantPair, Conversation>,
    users: HashMap<i64, UserSummary>,
    next_message_id: i64,
    next_conversation_id: i64,
}

/// Shared in-memory store implementing every chat repository trait.
#[derive(Default)]
pub struct InMemoryChatStore {
    state: RwLock<StoreState>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given accounts.
    pub fn with_users(users: impl IntoIterator<Item = UserSummary>) -> Self {
        let store = Self::new();
        for user in users {
            store.insert_user(user);
        }
        store
    }

    pub fn insert_user(&self, user: UserSummary) {
        self.state.write().users.insert(user.id, user);
    }

    /// Number of stored conversation rows.
    pub fn conversation_count(&self) -> usize {
        self.state.read().conversations.len()
    }
}

#[async_trait]
impl MessageRepository for InMemoryChatStore {
    async fn create(&self, message: &NewMessage) -> Result<Message, AppError> {
        let mut state = self.state.write();
        state.next_message_id += 1;
        let stored = Message {
            id: state.next_message_id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            content: message.content.clone(),
            created_at: message.created_at,
            read_at: None,
        };
        state.messages.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Message>, AppError> {
        Ok(self.state.read().messages.get(&id).cloned())
    }

    async fn find_between(
        &self,
        pair: ParticipantPair,
        page: PageRequest,
    ) -> Result<Vec<Message>, AppError> {
        let state = self.state.read();
        Ok(state
            .messages
            .values()
            .rev()
            .filter(|m| m.participants() == pair)
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect())
    }

    async fn mark_read(
        &self,
        id: i64,
        receiver_id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, AppError> {
        let mut state = self.state.write();
        match state.messages.get_mut(&id) {
            Some(message) if message.receiver_id == receiver_id => {
                if message.mark_read(at) {
                    Ok(Some(message.clone()))
                } else {
                    Ok(None)
                }
            }
            _ => Ok(None),
        }
    }

    async fn mark_all_read(
        &self,
        sender_id: i64,
        receiver_id: i64,
        at: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let mut state = self.state.write();
        let updated = state
            .messages
            .values_mut()
            .filter(|m| m.sender_id == sender_id && m.receiver_id == receiver_id)
            .filter_map(|m| m.mark_read(at).then_some(()))
            .count();
        Ok(updated as u64)
    }

    async fn count_unread(&self, receiver_id: i64) -> Result<i64, AppError> {
        let state = self.state.read();
        Ok(state
            .messages
            .values()
            .filter(|m| m.receiver_id == receiver_id && !m.is_read())
            .count() as i64)
    }

    async fn count_unread_by_sender(&self, receiver_id: i64) -> Result<HashMap<i64, i64>, AppError> {
        let state = self.state.read();
        let mut counts = HashMap::new();
        for message in state
            .messages
            .values()
            .filter(|m| m.receiver_id == receiver_id && !m.is_read())
        {
            *counts.entry(message.sender_id).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[async_trait]
impl ConversationRepository for InMemoryChatStore {
    async fn get_or_create(&self, pair: ParticipantPair) -> Result<Conversation, AppError> {
        let mut state = self.state.write();
        if let Some(existing) = state.conversations.get(&pair) {
            return Ok(existing.clone());
        }
        state.next_conversation_id += 1;
        let conversation = Conversation {
            id: state.next_conversation_id,
            user1_id: pair.low(),
            user2_id: pair.high(),
            last_message_id: None,
            last_message_at: None,
            created_at: Utc::now(),
        };
        state.conversations.insert(pair, conversation.clone());
        Ok(conversation)
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<ConversationPreview>, AppError> {
        let state = self.state.read();
        let mut previews: Vec<ConversationPreview> = state
            .conversations
            .values()
            .filter(|c| c.pair().contains(user_id))
            .map(|c| ConversationPreview {
                conversation: c.clone(),
                last_message: c
                    .last_message_id
                    .and_then(|id| state.messages.get(&id))
                    .map(|m| m.content.clone()),
            })
            .collect();

        // Option orders None first, so reversing puts message-less rows last.
        previews.sort_by(|a, b| {
            b.conversation
                .last_message_at
                .cmp(&a.conversation.last_message_at)
                .then(b.conversation.id.cmp(&a.conversation.id))
        });
        Ok(previews)
    }

    async fn update_last_message(
        &self,
        conversation_id: i64,
        message_id: i64,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut state = self.state.write();
        if !state.messages.contains_key(&message_id) {
            return Err(AppError::NotFound(format!("Message {} not found", message_id)));
        }
        let conversation = state
            .conversations
            .values_mut()
            .find(|c| c.id == conversation_id)
            .ok_or_else(|| AppError::NotFound(format!("Conversation {} not found", conversation_id)))?;

        if conversation.last_message_at.map_or(true, |current| current <= at) {
            conversation.last_message_id = Some(message_id);
            conversation.last_message_at = Some(at);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryChatStore {
    async fn exists(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.state.read().users.contains_key(&id))
    }

    async fn find_summaries(&self, ids: &[i64]) -> Result<HashMap<i64, UserSummary>, AppError> {
        let state = self.state.read();
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).map(|u| (*id, u.clone())))
            .collect())
    }
}
