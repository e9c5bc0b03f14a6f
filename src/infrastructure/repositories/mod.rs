//! Repository Implementations
//!
//! Implementations of the domain repository traits.
//!
//! - **PgMessageRepository** - message storage and read state
//! - **PgConversationRepository** - canonical per-pair conversation rows
//! - **PgUserRepository** - read-only user directory
//! - **InMemoryChatStore** - all three traits over process memory
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{
//!     PgConversationRepository, PgMessageRepository, PgUserRepository,
//! };
//!
//! fn setup_repositories(pool: PgPool) {
//!     let messages = PgMessageRepository::new(pool.clone());
//!     let conversations = PgConversationRepository::new(pool.clone());
//!     let users = PgUserRepository::new(pool);
//! }
//! ```

pub mod conversation_repository;
pub mod memory_repository;
pub mod message_repository;
pub mod user_repository;

pub use conversation_repository::PgConversationRepository;
pub use memory_repository::InMemoryChatStore;
pub use message_repository::PgMessageRepository;
pub use user_repository::PgUserRepository;
