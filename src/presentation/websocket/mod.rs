//! WebSocket Interface
//!
//! Real-time direct messaging over WebSocket connections.

pub mod handler;
pub mod hub;
pub mod messages;
pub mod session;

pub use handler::ws_handler;
pub use hub::{ConnectionId, Hub};
pub use messages::{ClientEvent, EventKind, ServerEvent};
pub use session::{Session, SessionConfig};
