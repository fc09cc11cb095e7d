//! Error types for the room layer.

use roomwire_protocol::{ProtocolError, RoomId};

/// Errors that can occur while configuring or tearing down a room
/// connection.
///
/// Connection-lifecycle failures (drops, terminal closes, exhausted
/// retries) are never returned as errors; they arrive as
/// [`RoomEvent`](crate::RoomEvent)s.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The configured base URL can't be used to build a connect target.
    #[error(transparent)]
    InvalidBaseUrl(#[from] ProtocolError),

    /// A retention limit of zero would discard every message.
    #[error("message retention limit must be at least 1")]
    ZeroRetention,

    /// An event buffer of zero could not hold even the final event.
    #[error("event capacity must be at least 1")]
    ZeroEventCapacity,

    /// The connection task panicked or was aborted.
    #[error("connection task for room {0} failed: {1}")]
    TaskFailed(RoomId, String),
}
