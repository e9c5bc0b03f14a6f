//! HTTP Interface
//!
//! REST handlers and the router that ties them to the WebSocket endpoint.

pub mod handlers;
pub mod routes;

pub use routes::create_router;
