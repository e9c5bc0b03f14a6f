//! Data Transfer Objects
//!
//! DTOs for API request/response serialization.

pub mod request;
pub mod response;

pub use request::{MessageHistoryQuery, SendMessageRequest};
pub use response::{DataResponse, OnlineStatusResponse, SuccessResponse, UnreadCountResponse};
