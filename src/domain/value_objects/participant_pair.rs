//! Canonical participant pair for one-to-one conversations.
//!
//! A conversation between users 7 and 3 is the same conversation as one
//! between 3 and 7. `ParticipantPair` stores the two identities with the
//! lower one first so that every unordered pair has exactly one key, both in
//! memory and in the `conversations (user1_id, user2_id)` unique index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Two conversation participants in canonical order (`low <= high`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantPair {
    low: i64,
    high: i64,
}

impl ParticipantPair {
    /// Build the canonical pair regardless of argument order.
    pub fn new(a: i64, b: i64) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Lower identity; stored as `user1_id`.
    pub fn low(&self) -> i64 {
        self.low
    }

    /// Higher identity; stored as `user2_id`.
    pub fn high(&self) -> i64 {
        self.high
    }

    pub fn contains(&self, user_id: i64) -> bool {
        self.low == user_id || self.high == user_id
    }

    /// The participant that is not `user_id`.
    ///
    /// Returns `None` when `user_id` is not part of the pair.
    pub fn other(&self, user_id: i64) -> Option<i64> {
        if user_id == self.low {
            Some(self.high)
        } else if user_id == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

impl fmt::Display for ParticipantPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.low, self.high)
    }
}
