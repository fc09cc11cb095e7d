//! Identity hook for learning who the caller is.
//!
//! roomwire doesn't log anyone in. That's your auth layer's job (cookie
//! session, OAuth, a CLI flag, whatever). Instead, roomwire defines the
//! [`IdentityProvider`] trait: a single async method that returns the
//! current identity, or `None` when nobody is signed in. A room connection
//! is never attempted without one.
//!
//! # Why a trait?
//!
//! So the same client code can run against a real auth backend in
//! production, a fixed identity in a CLI, and a hand-rolled stub in tests,
//! without changing any library code.

use std::future::Future;

use roomwire_protocol::UserId;

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Server-issued user id.
    pub id: UserId,
    /// Display name shown next to the caller's messages.
    pub username: String,
}

impl Identity {
    /// Creates an identity from raw parts.
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: UserId::new(id),
            username: username.into(),
        }
    }
}

/// Supplies the caller's current identity.
///
/// # Trait bounds
///
/// - `Send + Sync` → the provider can be shared across async tasks.
/// - `'static` → it doesn't borrow temporary data, since it usually lives
///   as long as the client.
///
/// # Example
///
/// ```rust
/// use roomwire_session::{Identity, IdentityProvider};
///
/// /// Reads the identity from the environment.
/// struct EnvIdentity;
///
/// impl IdentityProvider for EnvIdentity {
///     async fn current(&self) -> Option<Identity> {
///         let id = std::env::var("CHAT_USER_ID").ok()?;
///         let name = std::env::var("CHAT_USERNAME").ok()?;
///         Some(Identity::new(id, name))
///     }
/// }
/// ```
pub trait IdentityProvider: Send + Sync + 'static {
    /// Returns the signed-in identity, or `None` if nobody is signed in.
    fn current(&self) -> impl Future<Output = Option<Identity>> + Send;
}

/// An [`IdentityProvider`] that always answers with the same value.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<Identity>);

impl StaticIdentity {
    /// A provider that is always signed in as `identity`.
    pub fn new(identity: Identity) -> Self {
        Self(Some(identity))
    }

    /// A provider with nobody signed in.
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    async fn current(&self) -> Option<Identity> {
        self.0.clone()
    }
}
