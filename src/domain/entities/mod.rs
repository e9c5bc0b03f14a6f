//! # Domain Entities
//!
//! Core domain entities of the direct messaging subsystem.
//! All persisted entities map directly to their corresponding database tables.
//!
//! - **Message**: one directed message between two users
//! - **Conversation**: the single record of a user pair, pointing at its latest message
//! - **UserSummary**: read-only public profile owned by the account service
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod conversation;
mod message;
mod user;

pub use conversation::{Conversation, ConversationPreview, ConversationRepository};
pub use message::{Message, MessageRepository, NewMessage};
pub use user::{UserRepository, UserSummary};

#[cfg(test)]
pub use conversation::MockConversationRepository;
#[cfg(test)]
pub use message::MockMessageRepository;
#[cfg(test)]
pub use user::MockUserRepository;
