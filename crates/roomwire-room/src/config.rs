//! Connection configuration and state machine.

use std::time::Duration;

use roomwire_protocol::{validate_base_url, DEFAULT_BASE_URL};
use roomwire_retry::RetryConfig;

use crate::RoomError;

// ---------------------------------------------------------------------------
// ConnectionConfig
// ---------------------------------------------------------------------------

/// Configuration for a room connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// `ws://` or `wss://` root the join-room path is appended to.
    pub base_url: String,

    /// Reconnect policy for transient closes.
    pub retry: RetryConfig,

    /// Keep only the newest N messages. `None` keeps everything.
    pub retention: Option<usize>,

    /// How many unread events a connection buffers for its owner. When an
    /// owner falls further behind, the oldest events are skipped.
    pub event_capacity: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryConfig::default(),
            retention: None,
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ConnectionConfig {
    /// Default for [`event_capacity`](Self::event_capacity).
    pub const DEFAULT_EVENT_CAPACITY: usize = 256;

    /// Checks the config before any connection is spawned with it.
    pub fn validate(&self) -> Result<(), RoomError> {
        validate_base_url(&self.base_url)?;
        if self.retention == Some(0) {
            return Err(RoomError::ZeroRetention);
        }
        if self.event_capacity == 0 {
            return Err(RoomError::ZeroEventCapacity);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ConnectionState
// ---------------------------------------------------------------------------

/// The phase of the underlying socket.
///
/// ```text
/// Idle → Connecting → Open → Closed ─(transient, budget left)→ Connecting
///                                   └─(terminal / exhausted / disposed)→ stays Closed
/// ```
///
/// - **Idle**: the connection task has not started dialing yet.
/// - **Connecting**: a handshake is in flight.
/// - **Open**: frames flow both ways; `send` transmits.
/// - **Closed**: no socket. Either waiting out a backoff or finished
///   for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    /// Returns `true` if `send` would transmit right now.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Open => write!(f, "Open"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomEvent
// ---------------------------------------------------------------------------

/// Notifications a room connection publishes to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// The socket opened; the retry budget is full again.
    Opened,
    /// A chat message arrived and was appended to the log.
    Message(roomwire_protocol::ChatMessage),
    /// A transient close happened; reconnect `attempt` fires after `delay`.
    Reconnecting { attempt: u32, delay: Duration },
    /// The server says the room is gone or expired. Nothing more will
    /// happen on this connection; the caller should navigate away.
    Unavailable { code: Option<u16> },
    /// The reconnect budget ran out. Nothing more will happen on this
    /// connection.
    RetriesExhausted { attempts: u32 },
}

impl RoomEvent {
    /// Returns `true` for events after which the connection is done.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::RetriesExhausted { .. }
        )
    }
}
