//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **ParticipantPair**: canonical (lower id first) key of a one-to-one conversation
//! - **PageRequest**: clamped offset pagination for message history

mod page;
mod participant_pair;

pub use page::*;
pub use participant_pair::*;
