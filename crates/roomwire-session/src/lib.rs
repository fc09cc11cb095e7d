//! Caller identity and session context for roomwire.
//!
//! roomwire does not authenticate anyone. It consumes an identity someone
//! else already established:
//!
//! 1. **Identity**: who the caller is ([`Identity`], supplied by an
//!    [`IdentityProvider`])
//! 2. **Session context**: who is watching which room
//!    ([`SessionContext`]), the value a connection is bound to for its
//!    whole life
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)  ← binds one connection to one SessionContext
//!     ↕
//! Session Layer (this crate)  ← identity and context
//!     ↕
//! Protocol Layer (below)  ← provides RoomId, UserId
//! ```

mod error;
mod identity;
mod session;

pub use error::SessionError;
pub use identity::{Identity, IdentityProvider, StaticIdentity};
pub use session::SessionContext;
