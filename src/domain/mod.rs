//! # Domain Layer
//!
//! The domain layer contains the core business types of direct messaging.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Message, Conversation, UserSummary and their repository traits
//! - **value_objects**: ParticipantPair, PageRequest
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Entities encapsulate domain rules (read-once timestamps, canonical pairs)

pub mod entities;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use value_objects::*;
