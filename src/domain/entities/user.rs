//! Read-only view of user accounts.
//!
//! Accounts, passwords and profiles are owned by the account service; the
//! messaging subsystem only reads the public summary from the `users` table.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::shared::error::AppError;

/// Public profile fields shown next to a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub nickname: String,
    pub avatar_url: Option<String>,
}

impl UserSummary {
    /// Stand-in for an account that no longer resolves.
    pub fn unknown(id: i64) -> Self {
        Self {
            id,
            nickname: String::new(),
            avatar_url: None,
        }
    }
}

/// Repository trait for the user directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Whether an account with this ID exists.
    async fn exists(&self, id: i64) -> Result<bool, AppError>;

    /// Summaries for the given IDs. Missing accounts are absent from the map.
    async fn find_summaries(&self, ids: &[i64]) -> Result<HashMap<i64, UserSummary>, AppError>;
}
