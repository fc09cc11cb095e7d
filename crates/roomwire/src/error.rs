//! Unified error type for the roomwire client.

use roomwire_protocol::ProtocolError;
use roomwire_room::RoomError;
use roomwire_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `roomwire` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
///
/// Only setup can fail. Once a connection is running, connect failures,
/// drops and terminal closes are reported as
/// [`RoomEvent`](roomwire_room::RoomEvent)s, so transport errors never
/// surface here.
#[derive(Debug, thiserror::Error)]
pub enum RoomwireError {
    /// A protocol-level error (decode, bad base URL).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (blank room or user id).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (bad connection config, task failure).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// An environment variable held a value that couldn't be parsed.
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },
}
