//! Close-code classification.
//!
//! The room server closes a socket with a policy-violation or
//! unsupported-data code when the room does not exist or has expired. It
//! may also refuse the upgrade outright with `404`/`410`. Everything else
//! (going away, abnormal closure, no close frame at all) is a network
//! hiccup worth retrying.

/// RFC 6455 "policy violation".
pub const POLICY_VIOLATION: u16 = 1008;

/// RFC 6455 "unsupported data".
pub const UNSUPPORTED_DATA: u16 = 1003;

/// How the connection manager should react to a close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseKind {
    /// The room is gone or expired. Never retry.
    Terminal,
    /// Network-level failure. Retry with backoff.
    Transient,
}

impl CloseKind {
    /// Returns `true` for [`CloseKind::Terminal`].
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal)
    }
}

/// Classifies a close by its code. `None` (no close frame) is transient.
pub fn classify_close(code: Option<u16>) -> CloseKind {
    match code {
        Some(POLICY_VIOLATION | UNSUPPORTED_DATA) => CloseKind::Terminal,
        _ => CloseKind::Transient,
    }
}

/// Classifies an HTTP status returned instead of a protocol upgrade.
pub fn classify_rejection(status: u16) -> CloseKind {
    match status {
        404 | 410 => CloseKind::Terminal,
        _ => CloseKind::Transient,
    }
}
