//! Error types for the protocol layer.
//!
//! Each crate in roomwire defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in decoding a payload or
//! naming a target, not in networking or retry bookkeeping.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing `content`/`room_id`/`username`,
    /// or a payload that isn't a chat message at all.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The base URL cannot be used to build a connect target.
    #[error("invalid base url {0:?}: expected ws:// or wss://")]
    InvalidBaseUrl(String),
}
