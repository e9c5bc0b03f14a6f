//! Request DTOs
//!
//! Data structures for API request bodies and query strings.

use serde::{Deserialize, Deserializer};
use validator::Validate;

/// Send message request
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(range(min = 1, message = "Receiver ID must be positive"))]
    pub receiver_id: i64,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

/// Message history pagination query
///
/// Values are taken loosely; non-numeric or out-of-range values fall back
/// to defaults instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct MessageHistoryQuery {
    #[serde(default, deserialize_with = "loose_i64")]
    pub page: Option<i64>,
    #[serde(
        default,
        rename = "pageSize",
        alias = "page_size",
        deserialize_with = "loose_i64"
    )]
    pub page_size: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseInt {
    Int(i64),
    Text(String),
    Other(#[allow(dead_code)] serde::de::IgnoredAny),
}

/// Query strings arrive as text and JSON as numbers; anything unparsable is `None`.
fn loose_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<LooseInt>::deserialize(deserializer)? {
        Some(LooseInt::Int(n)) => Some(n),
        Some(LooseInt::Text(s)) => s.trim().parse().ok(),
        Some(LooseInt::Other(_)) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_validation() {
        let ok = SendMessageRequest {
            receiver_id: 2,
            content: "hi".into(),
        };
        assert!(ok.validate().is_ok());

        let bad = SendMessageRequest {
            receiver_id: 0,
            content: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("receiver_id"));
        assert!(fields.contains_key("content"));
    }

    #[test]
    fn test_history_query_accepts_both_spellings() {
        let camel: MessageHistoryQuery = serde_json::from_str(r#"{"page":2,"pageSize":10}"#).unwrap();
        assert_eq!((camel.page, camel.page_size), (Some(2), Some(10)));

        let snake: MessageHistoryQuery = serde_json::from_str(r#"{"page_size":5}"#).unwrap();
        assert_eq!((snake.page, snake.page_size), (None, Some(5)));
    }

    #[test]
    fn test_history_query_ignores_unparsable_values() {
        let text: MessageHistoryQuery =
            serde_json::from_str(r#"{"page":"3","pageSize":"abc"}"#).unwrap();
        assert_eq!((text.page, text.page_size), (Some(3), None));

        let odd: MessageHistoryQuery =
            serde_json::from_str(r#"{"page":true,"pageSize":null}"#).unwrap();
        assert_eq!((odd.page, odd.page_size), (None, None));

        let empty: MessageHistoryQuery = serde_json::from_str("{}").unwrap();
        assert_eq!((empty.page, empty.page_size), (None, None));
    }
}
