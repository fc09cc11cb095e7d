//! # roomwire
//!
//! Real-time chat room client.
//!
//! roomwire keeps one WebSocket connection per watched room. It carries
//! the caller's identity in the connect handshake, appends every inbound
//! message to an ordered log, and reconnects after network drops with a
//! bounded linear backoff. When the server says the room is gone (close
//! code 1008 or 1003) it stops and tells you so.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roomwire::prelude::*;
//!
//! # async fn demo() -> Result<(), RoomwireError> {
//! roomwire::init_tracing("roomwire=info");
//!
//! let client = RoomClient::builder()
//!     .config(ClientConfig::from_env()?)
//!     .build()?;
//!
//! let me = StaticIdentity::new(Identity::new("u1", "alice"));
//! let mut room = client.join(RoomId::new("r1"), &me).await?;
//!
//! while let Some(event) = room.next_event().await {
//!     match event {
//!         RoomEvent::Opened => room.send("hello"),
//!         RoomEvent::Message(msg) => println!("{}: {}", msg.username, msg.content),
//!         other if other.is_terminal() => break,
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{ClientConfig, RoomClient, RoomClientBuilder};
pub use error::RoomwireError;

// Re-export sub-crates for advanced usage.
pub use roomwire_protocol as protocol;
pub use roomwire_retry as retry;
pub use roomwire_room as room;
pub use roomwire_session as session;
pub use roomwire_transport as transport;

/// Installs a global `tracing` subscriber that writes to stderr.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used (for
/// example `"roomwire=debug"`). Calling it again is a no-op.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Convenience re-exports for common usage.
///
/// ```rust
/// use roomwire::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{ClientConfig, RoomClient, RoomClientBuilder, RoomwireError};

    pub use roomwire_protocol::{ChatMessage, RoomId, UserId};
    pub use roomwire_retry::RetryConfig;
    pub use roomwire_room::{
        ConnectionConfig, ConnectionState, MessageLog, RoomConnection,
        RoomEvent, RoomWatch,
    };
    pub use roomwire_session::{
        Identity, IdentityProvider, SessionContext, StaticIdentity,
    };
    pub use roomwire_transport::{Connector, WebSocketConnector};
}
