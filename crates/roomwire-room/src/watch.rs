//! Room watch: keeps exactly one connection bound to the caller's current
//! context.
//!
//! This is what a page or screen holds while it shows a room. When the
//! room or the signed-in user changes, the old connection is disposed and
//! a fresh one is spawned. When the identity goes away, the watch goes
//! idle and makes no connection attempts at all.

use std::sync::Arc;

use roomwire_protocol::ChatMessage;
use roomwire_session::SessionContext;
use roomwire_transport::Connector;

use crate::{ConnectionConfig, EventHook, RoomConnection, RoomEvent};

/// Owns the connection for whichever room the caller is looking at.
pub struct RoomWatch<C: Connector> {
    connector: Arc<C>,
    config: ConnectionConfig,
    hook: Option<EventHook>,
    /// The live connection. At most ONE at a time (key invariant).
    current: Option<RoomConnection>,
}

impl<C: Connector> RoomWatch<C> {
    /// Creates an idle watch.
    pub fn new(
        connector: Arc<C>,
        config: ConnectionConfig,
        hook: Option<EventHook>,
    ) -> Self {
        Self {
            connector,
            config,
            hook,
            current: None,
        }
    }

    /// Points the watch at a new context.
    ///
    /// - `None`: dispose any connection and go idle.
    /// - Same room and user as a connection that is still trying: keep it.
    /// - Anything else, including the same context after the old connection
    ///   gave up: dispose the old connection, then spawn one new connection
    ///   for `context`. The old message log is not carried over.
    ///
    /// Returns `true` if a new connection was spawned.
    pub fn update(&mut self, context: Option<SessionContext>) -> bool {
        let Some(context) = context else {
            if let Some(old) = self.current.take() {
                tracing::info!(
                    room_id = %old.context().room_id,
                    "identity gone, closing room connection"
                );
                old.dispose();
            }
            return false;
        };

        if let Some(old) = &self.current {
            if old.is_finished() {
                tracing::info!(
                    room_id = %context.room_id,
                    "previous connection gave up, rejoining"
                );
            } else if old.context().requires_reconnect(&context) {
                tracing::info!(
                    from = %old.context().room_id,
                    to = %context.room_id,
                    "session context changed, reconnecting"
                );
                old.dispose();
            } else {
                return false;
            }
        }

        self.current = Some(RoomConnection::spawn(
            Arc::clone(&self.connector),
            context,
            &self.config,
            self.hook.clone(),
        ));
        true
    }

    /// The live connection, if any.
    pub fn connection(&self) -> Option<&RoomConnection> {
        self.current.as_ref()
    }

    /// Mutable access to the live connection, for reading events.
    pub fn connection_mut(&mut self) -> Option<&mut RoomConnection> {
        self.current.as_mut()
    }

    /// Sends through the live connection. No-op when idle or not open.
    pub fn send(&self, text: impl Into<String>) {
        if let Some(conn) = &self.current {
            conn.send(text);
        }
    }

    /// Messages received on the live connection; empty when idle.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.current
            .as_ref()
            .map(RoomConnection::messages)
            .unwrap_or_default()
    }

    /// Next event from the live connection. Returns `None` immediately
    /// when idle.
    pub async fn next_event(&mut self) -> Option<RoomEvent> {
        match self.current.as_mut() {
            Some(conn) => conn.next_event().await,
            None => None,
        }
    }

    /// Returns `true` when no connection is held.
    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Disposes the live connection, if any, and goes idle.
    pub fn dispose(&mut self) {
        if let Some(conn) = self.current.take() {
            conn.dispose();
        }
    }
}
