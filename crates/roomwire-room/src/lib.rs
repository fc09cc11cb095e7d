//! Room connection management for roomwire.
//!
//! Each watched room gets one Tokio task (actor model) that owns the
//! socket, the retry counter and the message log. The owner keeps a
//! handle and talks to the task over channels.
//!
//! # Key types
//!
//! - [`RoomConnection`]: handle to one running connection task
//! - [`RoomWatch`]: swaps connections as the room or identity changes
//! - [`ConnectionState`]: socket lifecycle state machine
//! - [`RoomEvent`]: what the task reports back (messages, reconnects,
//!   terminal conditions)
//! - [`MessageLog`]: the append-only, arrival-ordered message sequence
//! - [`ConnectionConfig`]: base URL, retry policy, retention

mod config;
mod connection;
mod error;
mod log;
mod watch;

pub use config::{ConnectionConfig, ConnectionState, RoomEvent};
pub use connection::{EventHook, RoomConnection};
pub use error::RoomError;
pub use log::MessageLog;
pub use watch::RoomWatch;
