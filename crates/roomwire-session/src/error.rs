//! Error types for the session layer.

/// Errors that can occur while building a session context.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The room id was empty.
    #[error("room id must not be empty")]
    EmptyRoomId,

    /// The identity carried an empty user id.
    #[error("user id must not be empty")]
    EmptyUserId,
}
