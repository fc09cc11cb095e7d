//! Transport abstraction layer for roomwire.
//!
//! Provides the [`Connector`] and [`Connection`] traits that abstract over
//! how a client reaches a room's message stream, so the connection manager
//! can run against a real WebSocket or a scripted stand-in.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket connector via `tokio-tungstenite`

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketConnector};

use std::fmt;
use std::future::Future;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// What a connection yielded on a single receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A data frame (text or binary) from the peer.
    Payload(Vec<u8>),
    /// The peer closed the connection. Carries the close code when the
    /// close frame had one; `None` for abnormal closure or a dropped stream.
    Closed(Option<u16>),
}

/// Opens new outgoing connections.
///
/// Each call produces a fresh, independent connection; implementations must
/// not hand back a previously used instance.
pub trait Connector: Send + Sync + 'static {
    /// The connection type produced by this connector.
    type Connection: Connection;

    /// Connects to `target` and completes the handshake.
    fn connect(
        &self,
        target: &str,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;
}

/// A single open connection that can send text and receive frames.
pub trait Connection: Send + Sync + 'static {
    /// Sends one text frame to the remote peer, verbatim.
    fn send_text(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next frame from the remote peer.
    ///
    /// Control frames (ping/pong) are skipped. Returns
    /// [`Inbound::Closed`] once the peer closes.
    fn recv(&self) -> impl Future<Output = Result<Inbound, TransportError>> + Send;

    /// Closes the connection.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_rejection_status_only_for_rejected() {
        assert_eq!(TransportError::Rejected(404).rejection_status(), Some(404));
        let err = TransportError::ConnectionClosed("gone".into());
        assert_eq!(err.rejection_status(), None);
    }

    #[test]
    fn test_inbound_closed_carries_code() {
        assert_ne!(Inbound::Closed(Some(1008)), Inbound::Closed(None));
    }
}
