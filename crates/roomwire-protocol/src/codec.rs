//! Codec trait and implementations for decoding inbound payloads.
//!
//! Inbound frames are decoded into typed values; outbound frames are the
//! caller's raw text and never pass through a codec. Today the room server
//! speaks JSON, so [`JsonCodec`] is the only implementation.

use serde::de::DeserializeOwned;

use crate::ProtocolError;

/// A codec that decodes inbound bytes into Rust types.
///
/// `Send + Sync + 'static` because the codec lives inside the connection
/// task, which Tokio may move between worker threads.
pub trait Codec: Send + Sync + 'static {
    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use roomwire_protocol::{ChatMessage, Codec, JsonCodec, RoomId};
///
/// let codec = JsonCodec;
/// let msg: ChatMessage = codec
///     .decode(br#"{"content":"hi","room_id":"r1","username":"alice"}"#)
///     .unwrap();
/// assert_eq!(msg.room_id, RoomId::new("r1"));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
