//! Core protocol types for roomwire's wire format.
//!
//! Everything in this module travels "on the wire": the server serializes
//! it to JSON, sends it over the room's WebSocket, and the client decodes
//! it on arrival.

use std::fmt;

use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// An opaque identifier for a chat room.
///
/// Newtype wrapper around the server's id string (a UUID in practice, but
/// the client never looks inside). Wrapping it means a `UserId` can't be
/// passed where a `RoomId` is expected, even though both are strings.
///
/// `#[serde(transparent)]` keeps the JSON form a bare string: `"r1"`, not
/// `{ "0": "r1" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Creates a room id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque identifier for a user, issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Creates a user id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ChatMessage
// ---------------------------------------------------------------------------

/// A chat message as broadcast by the room server.
///
/// Immutable once received. The server sends these for live messages and
/// also replays recent history right after a client joins, flagging
/// replayed system notices with `system: true`.
///
/// ## Wire shape
///
/// ```json
/// { "content": "hi", "room_id": "r1", "username": "alice",
///   "user_id": "u-1", "system": false }
/// ```
///
/// `user_id` and `system` are optional. The server writes an empty
/// `user_id` for anonymous or system messages, which decodes to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatMessage {
    /// The message body.
    pub content: String,
    /// The room the message was posted to.
    pub room_id: RoomId,
    /// Display name of the author.
    pub username: String,
    /// Author's id, when the author was an identified user.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub user_id: Option<UserId>,
    /// `true` for server-generated notices.
    #[serde(default)]
    pub system: bool,
}

impl ChatMessage {
    /// Builds a plain user message.
    pub fn new(
        content: impl Into<String>,
        room_id: RoomId,
        username: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            room_id,
            username: username.into(),
            user_id: None,
            system: false,
        }
    }

    /// Attaches the author's user id.
    pub fn with_user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<UserId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(UserId))
}
