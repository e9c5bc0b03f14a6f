//! WebSocket Session
//!
//! Drives one connection: a read loop that decodes client frames and routes
//! them through the chat service, and a write loop that drains the hub queue
//! to the socket with a heartbeat.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message as WsMessage;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval_at, timeout, Instant};

use super::hub::{ConnectionId, Hub};
use super::messages::{ClientEvent, ServerEvent};
use crate::application::services::{ChatError, ChatService, ReadOutcome};
use crate::config::WebSocketSettings;

/// Timing parameters of a session
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub heartbeat_interval: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl From<&WebSocketSettings> for SessionConfig {
    fn from(settings: &WebSocketSettings) -> Self {
        Self {
            heartbeat_interval: settings.heartbeat_interval(),
            read_timeout: settings.read_timeout(),
            write_timeout: settings.write_timeout(),
        }
    }
}

/// An authenticated connection registered in the hub
pub struct Session {
    user_id: i64,
    connection_id: ConnectionId,
    hub: Arc<Hub>,
    chat: Arc<dyn ChatService>,
}

impl Session {
    pub fn new(
        user_id: i64,
        connection_id: ConnectionId,
        hub: Arc<Hub>,
        chat: Arc<dyn ChatService>,
    ) -> Self {
        Self {
            user_id,
            connection_id,
            hub,
            chat,
        }
    }

    /// Run both loops until either ends, then leave the hub.
    pub async fn run<S, R, E>(
        self,
        sink: S,
        stream: R,
        outbound: mpsc::Receiver<String>,
        config: SessionConfig,
    ) where
        S: Sink<WsMessage> + Unpin + Send + 'static,
        S::Error: Display,
        R: Stream<Item = Result<WsMessage, E>> + Unpin + Send,
        E: Display,
    {
        let mut write_task = tokio::spawn(write_loop(
            sink,
            outbound,
            config,
            self.user_id,
            self.connection_id,
        ));

        tokio::select! {
            _ = self.read_loop(stream, config.read_timeout) => write_task.abort(),
            _ = &mut write_task => {}
        }

        self.hub.unregister(self.user_id, self.connection_id);
        tracing::info!(
            user_id = self.user_id,
            connection_id = %self.connection_id,
            "Session closed"
        );
    }

    async fn read_loop<R, E>(&self, mut stream: R, read_timeout: Duration)
    where
        R: Stream<Item = Result<WsMessage, E>> + Unpin,
        E: Display,
    {
        loop {
            let frame = match timeout(read_timeout, stream.next()).await {
                Ok(Some(Ok(frame))) => frame,
                Ok(Some(Err(e))) => {
                    tracing::debug!(user_id = self.user_id, error = %e, "WebSocket read error");
                    break;
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::info!(user_id = self.user_id, "Read deadline expired");
                    break;
                }
            };

            match frame {
                WsMessage::Text(text) => self.handle_text(text.as_str()).await,
                WsMessage::Close(_) => break,
                // Any other frame only counts as activity.
                _ => {}
            }
        }
    }

    async fn handle_text(&self, text: &str) {
        match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => self.handle_event(event).await,
            Err(e) => {
                tracing::debug!(user_id = self.user_id, error = %e, "Dropping undecodable frame");
            }
        }
    }

    /// Route one decoded client event.
    pub async fn handle_event(&self, event: ClientEvent) {
        match event {
            ClientEvent::Message { to, content } => {
                match self.chat.send_message(self.user_id, to, &content).await {
                    Ok(message) => {
                        let live = self.hub.deliver_message(&message);
                        tracing::debug!(user_id = self.user_id, message_id = message.id, live, "Message routed");
                    }
                    Err(e) => {
                        tracing::debug!(user_id = self.user_id, to, error = %e, "Send rejected");
                        self.hub.deliver(self.user_id, &ServerEvent::error(client_error(&e)));
                    }
                }
            }
            ClientEvent::Typing { to } => {
                if to > 0 && to != self.user_id {
                    self.hub.deliver(to, &ServerEvent::typing(self.user_id, to));
                }
            }
            ClientEvent::Read { message_id, .. } => {
                match self.chat.mark_as_read(message_id, self.user_id).await {
                    Ok(ReadOutcome::Marked(message)) => {
                        self.hub.deliver(
                            message.sender_id,
                            &ServerEvent::read(self.user_id, message.sender_id, message.id),
                        );
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(user_id = self.user_id, message_id, error = %e, "Mark read failed");
                    }
                }
            }
        }
    }
}

fn client_error(e: &ChatError) -> String {
    match e {
        ChatError::Internal(_) => "failed to send message".to_string(),
        other => other.to_string(),
    }
}

/// Drain the outbound queue to the socket, pinging on every heartbeat tick.
async fn write_loop<S>(
    mut sink: S,
    mut outbound: mpsc::Receiver<String>,
    config: SessionConfig,
    user_id: i64,
    connection_id: ConnectionId,
) where
    S: Sink<WsMessage> + Unpin,
    S::Error: Display,
{
    let mut heartbeat = interval_at(
        Instant::now() + config.heartbeat_interval,
        config.heartbeat_interval,
    );

    loop {
        let frame = tokio::select! {
            payload = outbound.recv() => match payload {
                Some(text) => WsMessage::Text(text.into()),
                None => {
                    // Superseded or dropped by the hub.
                    let _ = timeout(config.write_timeout, sink.send(WsMessage::Close(None))).await;
                    return;
                }
            },
            _ = heartbeat.tick() => WsMessage::Ping(Default::default()),
        };

        match timeout(config.write_timeout, sink.send(frame)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(user_id, connection_id = %connection_id, error = %e, "WebSocket write error");
                return;
            }
            Err(_) => {
                tracing::info!(user_id, connection_id = %connection_id, "Write deadline expired");
                return;
            }
        }
    }
}
