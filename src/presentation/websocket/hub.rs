//! Connection Hub
//!
//! Registry of the live connection of every online user. One entry per
//! user; a newer connection replaces the older one.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use super::messages::ServerEvent;
use crate::domain::Message;
use crate::infrastructure::metrics::{self, DeliveryOutcome};

/// Identifies one physical connection of a user
pub type ConnectionId = Uuid;

/// Registered connection with its outbound queue
struct Connection {
    id: ConnectionId,
    sender: mpsc::Sender<String>,
    connected_at: DateTime<Utc>,
}

/// In-process registry of live connections
pub struct Hub {
    /// Live connection per user ID
    connections: DashMap<i64, Connection>,
    /// Capacity of each connection's outbound queue
    buffer_size: usize,
}

impl Hub {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            connections: DashMap::new(),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Register a new connection for the user and return its outbound queue.
    pub fn register(&self, user_id: i64) -> (ConnectionId, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(self.buffer_size);
        let id = Uuid::new_v4();
        self.register_sender(user_id, id, sender);
        (id, receiver)
    }

    /// Install `sender` as the user's connection.
    ///
    /// A previous connection is dropped in the same step, which closes its
    /// queue and ends its write loop.
    pub fn register_sender(&self, user_id: i64, id: ConnectionId, sender: mpsc::Sender<String>) {
        let previous = self.connections.insert(
            user_id,
            Connection {
                id,
                sender,
                connected_at: Utc::now(),
            },
        );

        if let Some(previous) = previous {
            tracing::info!(
                user_id,
                connection_id = %previous.id,
                connected_at = %previous.connected_at,
                "Connection superseded"
            );
        }

        metrics::set_websocket_connections(self.connections.len());
        tracing::info!(user_id, connection_id = %id, "Connection registered");
    }

    /// Remove the user's entry if it is still `id`.
    ///
    /// Returns `false` when a newer connection has taken its place.
    pub fn unregister(&self, user_id: i64, id: ConnectionId) -> bool {
        let removed = self
            .connections
            .remove_if(&user_id, |_, conn| conn.id == id)
            .is_some();

        if removed {
            metrics::set_websocket_connections(self.connections.len());
            tracing::info!(user_id, connection_id = %id, "Connection unregistered");
        }
        removed
    }

    /// Queue a serialized frame for the user without waiting.
    ///
    /// A connection whose queue is full or closed is torn down; the message
    /// stays retrievable from history.
    pub fn deliver_to_user(&self, user_id: i64, payload: String) -> bool {
        // Guard must be released before remove_if on the same key.
        let (id, result) = {
            let Some(conn) = self.connections.get(&user_id) else {
                metrics::record_delivery(DeliveryOutcome::Offline);
                return false;
            };
            (conn.id, conn.sender.try_send(payload))
        };

        match result {
            Ok(()) => {
                metrics::record_delivery(DeliveryOutcome::Delivered);
                true
            }
            Err(e) => {
                let reason = match e {
                    TrySendError::Full(_) => "outbound buffer full",
                    TrySendError::Closed(_) => "connection closed",
                };
                tracing::warn!(user_id, connection_id = %id, reason, "Dropping slow connection");
                self.unregister(user_id, id);
                metrics::record_delivery(DeliveryOutcome::Dropped);
                false
            }
        }
    }

    /// Serialize `event` once and deliver it to the user.
    pub fn deliver(&self, user_id: i64, event: &ServerEvent) -> bool {
        match serde_json::to_string(event) {
            Ok(payload) => self.deliver_to_user(user_id, payload),
            Err(e) => {
                tracing::error!(user_id, error = %e, "Failed to serialize event");
                false
            }
        }
    }

    /// Echo a stored message to its sender and deliver it to its receiver.
    ///
    /// Returns whether the receiver got it live.
    pub fn deliver_message(&self, message: &Message) -> bool {
        let event = ServerEvent::message(message);
        self.deliver(message.sender_id, &event);
        self.deliver(message.receiver_id, &event)
    }

    /// Point-in-time presence check
    pub fn is_online(&self, user_id: i64) -> bool {
        self.connections.contains_key(&user_id)
    }

    pub fn online_count(&self) -> usize {
        self.connections.len()
    }
}
