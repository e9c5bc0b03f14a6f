//! Presentation Layer
//!
//! HTTP routes, middleware and the WebSocket connection hub.

pub mod http;
pub mod middleware;
pub mod websocket;
