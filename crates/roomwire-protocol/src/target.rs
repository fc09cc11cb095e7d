//! Connect target construction.
//!
//! Identity travels in the handshake request itself; nothing is negotiated
//! after the socket opens. The target shape is
//! `{base}/ws/joinRoom/{room_id}?userId={user_id}&username={username}`.

use crate::{ProtocolError, RoomId, UserId};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "ws://localhost:8080";

/// Checks that `base` is a WebSocket URL the target can be built on.
pub fn validate_base_url(base: &str) -> Result<(), ProtocolError> {
    let rest = base
        .strip_prefix("ws://")
        .or_else(|| base.strip_prefix("wss://"));
    match rest {
        Some(host) if !host.trim_end_matches('/').is_empty() => Ok(()),
        _ => Err(ProtocolError::InvalidBaseUrl(base.to_string())),
    }
}

/// Builds the join-room URL for a session.
///
/// The username is percent-encoded. Ids are opaque server-issued tokens and
/// are encoded as well so an odd id can't break the path.
pub fn join_room_target(
    base: &str,
    room_id: &RoomId,
    user_id: &UserId,
    username: &str,
) -> String {
    format!(
        "{}/ws/joinRoom/{}?userId={}&username={}",
        base.trim_end_matches('/'),
        urlencoding::encode(room_id.as_str()),
        urlencoding::encode(user_id.as_str()),
        urlencoding::encode(username),
    )
}
