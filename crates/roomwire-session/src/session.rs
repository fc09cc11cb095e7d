//! Session context: who is watching which room.
//!
//! A connection is bound to exactly one context for its whole life. The
//! room id and user id are baked into the handshake target, so changing
//! either one means the old socket no longer speaks for the caller and a
//! new connection is needed. The username only matters for display and
//! does not force a reconnect.

use roomwire_protocol::{RoomId, UserId};

use crate::{Identity, SessionError};

/// The `(room_id, user_id, username)` triple a connection is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Room being watched.
    pub room_id: RoomId,
    /// Caller's user id.
    pub user_id: UserId,
    /// Caller's display name.
    pub username: String,
}

impl SessionContext {
    /// Binds an identity to a room.
    ///
    /// # Errors
    /// Returns [`SessionError::EmptyRoomId`] or
    /// [`SessionError::EmptyUserId`] when either id is blank.
    pub fn new(
        room_id: RoomId,
        identity: Identity,
    ) -> Result<Self, SessionError> {
        if room_id.as_str().trim().is_empty() {
            return Err(SessionError::EmptyRoomId);
        }
        if identity.id.as_str().trim().is_empty() {
            return Err(SessionError::EmptyUserId);
        }
        Ok(Self {
            room_id,
            user_id: identity.id,
            username: identity.username,
        })
    }

    /// Returns `true` if moving from `self` to `next` invalidates the
    /// existing connection.
    pub fn requires_reconnect(&self, next: &SessionContext) -> bool {
        self.room_id != next.room_id || self.user_id != next.user_id
    }
}
