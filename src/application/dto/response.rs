//! Response DTOs
//!
//! Data structures for API response bodies.

use serde::Serialize;

/// `{"data": ...}` envelope used by the chat endpoints
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Acknowledgement for read-state updates
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<u64>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            updated: None,
        }
    }

    pub fn updated(count: u64) -> Self {
        Self {
            success: true,
            updated: Some(count),
        }
    }
}

/// Unread message count response
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// Presence response
#[derive(Debug, Serialize)]
pub struct OnlineStatusResponse {
    pub user_id: i64,
    pub online: bool,
}
