//! `RoomClient` builder and client configuration.
//!
//! This is the entry point for a chat client. It ties together all the
//! layers: session → room → protocol → transport.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use roomwire_protocol::{RoomId, DEFAULT_BASE_URL};
use roomwire_retry::RetryConfig;
use roomwire_room::{
    ConnectionConfig, EventHook, RoomConnection, RoomEvent, RoomWatch,
};
use roomwire_session::{IdentityProvider, SessionContext};
use roomwire_transport::{Connector, WebSocketConnector};

use crate::RoomwireError;

/// Client configuration.
///
/// All fields have defaults suitable for local development. Override them
/// in code or through the environment with [`ClientConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `ws://` or `wss://` root of the chat server (default:
    /// `ws://localhost:8080`).
    pub base_url: String,
    /// Reconnect policy (default: 5 attempts, 500 ms delay unit).
    pub retry: RetryConfig,
    /// Keep only the newest N messages per room (default: keep all).
    pub retention: Option<usize>,
    /// Unread events buffered per room before the oldest are skipped
    /// (default: 256).
    pub event_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryConfig::default(),
            retention: None,
            event_capacity: ConnectionConfig::DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ClientConfig {
    pub const ENV_WEBSOCKET_URL: &'static str = "ROOMWIRE_WEBSOCKET_URL";
    pub const ENV_MAX_RETRIES: &'static str = "ROOMWIRE_MAX_RETRIES";
    pub const ENV_RETRY_BASE_MS: &'static str = "ROOMWIRE_RETRY_BASE_MS";

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default               |
    /// |--------------------------|-----------------------|
    /// | `ROOMWIRE_WEBSOCKET_URL` | `ws://localhost:8080` |
    /// | `ROOMWIRE_MAX_RETRIES`   | `5`                   |
    /// | `ROOMWIRE_RETRY_BASE_MS` | `500`                 |
    ///
    /// Unset variables fall back to the default; set but unparseable ones
    /// are an error.
    pub fn from_env() -> Result<Self, RoomwireError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading values through `lookup`.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, RoomwireError> {
        let mut config = Self::default();

        if let Some(url) = lookup(Self::ENV_WEBSOCKET_URL) {
            let url = url.trim();
            if !url.is_empty() {
                config.base_url = url.to_string();
            }
        }
        if let Some(max) = parse_var::<u32>(&lookup, Self::ENV_MAX_RETRIES)? {
            config.retry.max_attempts = max;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, Self::ENV_RETRY_BASE_MS)? {
            config.retry.base_delay = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// The per-connection config derived from this client config.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            base_url: self.base_url.clone(),
            retry: self.retry.clone(),
            retention: self.retention,
            event_capacity: self.event_capacity,
        }
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, RoomwireError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| RoomwireError::InvalidEnv {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        })
}

/// Builder for configuring a [`RoomClient`].
///
/// # Example
///
/// ```rust,no_run
/// use roomwire::prelude::*;
///
/// # fn demo() -> Result<(), RoomwireError> {
/// let client = RoomClient::builder()
///     .config(ClientConfig::from_env()?)
///     .on_event(|room, event| println!("{room}: {event:?}"))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct RoomClientBuilder {
    config: ClientConfig,
    hook: Option<EventHook>,
}

impl RoomClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            hook: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the chat server root.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Sets the reconnect policy.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Keeps only the newest `limit` messages per room.
    pub fn retention(mut self, limit: usize) -> Self {
        self.config.retention = Some(limit);
        self
    }

    /// Sets how many unread events each connection buffers.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    /// Registers an observer called for every event of every connection
    /// this client starts.
    pub fn on_event(
        mut self,
        hook: impl Fn(&RoomId, &RoomEvent) + Send + Sync + 'static,
    ) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Builds a client that dials real WebSockets.
    pub fn build(self) -> Result<RoomClient<WebSocketConnector>, RoomwireError> {
        self.build_with(WebSocketConnector)
    }

    /// Builds a client on top of a custom connector.
    pub fn build_with<C: Connector>(
        self,
        connector: C,
    ) -> Result<RoomClient<C>, RoomwireError> {
        let config = self.config.connection_config();
        config.validate()?;
        tracing::debug!(
            base_url = %config.base_url,
            max_attempts = config.retry.max_attempts,
            "room client configured"
        );
        Ok(RoomClient {
            connector: Arc::new(connector),
            config,
            hook: self.hook,
        })
    }
}

impl Default for RoomClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A configured chat client.
///
/// Holds the connector and settings shared by every room connection it
/// starts. Cheap to share behind an `Arc`; starting connections only
/// needs `&self`.
pub struct RoomClient<C: Connector> {
    connector: Arc<C>,
    config: ConnectionConfig,
    hook: Option<EventHook>,
}

impl RoomClient<WebSocketConnector> {
    /// Creates a new builder.
    pub fn builder() -> RoomClientBuilder {
        RoomClientBuilder::new()
    }
}

impl<C: Connector> RoomClient<C> {
    /// The validated per-connection config.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Starts a single connection bound to `context`.
    pub fn connect(&self, context: SessionContext) -> RoomConnection {
        RoomConnection::spawn(
            Arc::clone(&self.connector),
            context,
            &self.config,
            self.hook.clone(),
        )
    }

    /// An idle watch that starts connections on [`RoomWatch::update`].
    pub fn watcher(&self) -> RoomWatch<C> {
        RoomWatch::new(
            Arc::clone(&self.connector),
            self.config.clone(),
            self.hook.clone(),
        )
    }

    /// A watch already pointed at `context`. `None` gives an idle watch.
    pub fn watch(&self, context: Option<SessionContext>) -> RoomWatch<C> {
        let mut watch = self.watcher();
        watch.update(context);
        watch
    }

    /// Resolves the caller through `identity` and watches `room_id` as
    /// them.
    ///
    /// Nobody signed in yields an idle watch and no connection attempt.
    pub async fn join<P: IdentityProvider>(
        &self,
        room_id: RoomId,
        identity: &P,
    ) -> Result<RoomWatch<C>, RoomwireError> {
        let context = resolve(room_id, identity).await?;
        Ok(self.watch(context))
    }

    /// Re-resolves the caller and repoints `watch`. Returns `true` if a
    /// new connection was started.
    ///
    /// Call this whenever the room being viewed or the signed-in user may
    /// have changed.
    pub async fn rewatch<P: IdentityProvider>(
        &self,
        watch: &mut RoomWatch<C>,
        room_id: RoomId,
        identity: &P,
    ) -> Result<bool, RoomwireError> {
        let context = resolve(room_id, identity).await?;
        Ok(watch.update(context))
    }
}

async fn resolve<P: IdentityProvider>(
    room_id: RoomId,
    identity: &P,
) -> Result<Option<SessionContext>, RoomwireError> {
    match identity.current().await {
        Some(identity) => Ok(Some(SessionContext::new(room_id, identity)?)),
        None => {
            tracing::debug!(%room_id, "no identity, staying idle");
            Ok(None)
        }
    }
}
