//! Wire protocol for roomwire.
//!
//! This crate defines the "language" a chat client and the room server
//! speak:
//!
//! - **Types** ([`ChatMessage`], [`RoomId`], [`UserId`]): what arrives
//!   on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how inbound payloads are
//!   turned into those types.
//! - **Close codes** ([`CloseKind`], [`classify_close`]): which server
//!   closes mean "the room is gone" and which are worth retrying.
//! - **Target** ([`join_room_target`]): the handshake URL that carries
//!   the caller's identity.
//! - **Errors** ([`ProtocolError`]): what can go wrong along the way.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and the room
//! connection manager. It doesn't know about sockets or retries; it only
//! knows how to name things and how to decode them.
//!
//! ```text
//! Transport (frames) → Protocol (ChatMessage) → Room (message log, events)
//! ```

mod close;
mod codec;
mod error;
mod target;
mod types;

pub use close::{
    classify_close, classify_rejection, CloseKind, POLICY_VIOLATION,
    UNSUPPORTED_DATA,
};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use target::{join_room_target, validate_base_url, DEFAULT_BASE_URL};
pub use types::{ChatMessage, RoomId, UserId};
