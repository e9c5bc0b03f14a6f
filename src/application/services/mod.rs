//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **ChatService**: direct message send, history, read state, conversation list

pub mod chat_service;

pub use chat_service::{ChatError, ChatService, ChatServiceImpl, ConversationSummary, ReadOutcome};
