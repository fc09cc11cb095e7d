//! Scripted in-memory connector shared by the room integration tests.
//!
//! Every accepted connection is handed to the test as a [`MockServer`], the
//! far end of the socket: the test pushes frames and closes through it and
//! reads back whatever the client sent.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use roomwire_protocol::RoomId;
use roomwire_room::{RoomConnection, RoomEvent};
use roomwire_session::{Identity, SessionContext};
use roomwire_transport::{
    Connection, ConnectionId, Connector, Inbound, TransportError,
};
use tokio::sync::mpsc;

/// What the connector does with one connect attempt.
#[derive(Debug, Clone, Copy)]
pub enum Plan {
    Accept,
    Refuse,
    Reject(u16),
}

#[derive(Clone)]
pub struct MockConnector {
    targets: Arc<Mutex<Vec<String>>>,
    plan: Arc<Mutex<VecDeque<Plan>>>,
    fallback: Plan,
    accepted: mpsc::UnboundedSender<MockServer>,
    next_id: Arc<AtomicU64>,
}

impl MockConnector {
    /// A connector that accepts every attempt unless scripted otherwise.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MockServer>) {
        Self::with_fallback(Plan::Accept)
    }

    /// A connector that falls back to `fallback` once the script runs out.
    pub fn with_fallback(
        fallback: Plan,
    ) -> (Self, mpsc::UnboundedReceiver<MockServer>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connector = Self {
            targets: Arc::default(),
            plan: Arc::default(),
            fallback,
            accepted: tx,
            next_id: Arc::new(AtomicU64::new(1)),
        };
        (connector, rx)
    }

    /// Queues plans for the next connect attempts, in order.
    pub fn script(&self, plans: impl IntoIterator<Item = Plan>) {
        self.plan.lock().unwrap().extend(plans);
    }

    /// Every target dialed so far.
    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.targets.lock().unwrap().len()
    }
}

impl Connector for MockConnector {
    type Connection = MockConnection;

    async fn connect(
        &self,
        target: &str,
    ) -> Result<MockConnection, TransportError> {
        self.targets.lock().unwrap().push(target.to_string());
        let plan = self
            .plan
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);

        match plan {
            Plan::Refuse => Err(TransportError::ConnectFailed(
                std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "refused",
                ),
            )),
            Plan::Reject(status) => Err(TransportError::Rejected(status)),
            Plan::Accept => {
                let (to_client, inbound) = mpsc::unbounded_channel();
                let (sent, from_client) = mpsc::unbounded_channel();
                let closed = Arc::new(AtomicBool::new(false));
                let id = ConnectionId::new(
                    self.next_id.fetch_add(1, Ordering::Relaxed),
                );
                let _ = self.accepted.send(MockServer {
                    target: target.to_string(),
                    to_client,
                    from_client,
                    closed: Arc::clone(&closed),
                });
                Ok(MockConnection {
                    id,
                    inbound: tokio::sync::Mutex::new(inbound),
                    sent,
                    closed,
                })
            }
        }
    }
}

pub struct MockConnection {
    id: ConnectionId,
    inbound:
        tokio::sync::Mutex<mpsc::UnboundedReceiver<Result<Inbound, TransportError>>>,
    sent: mpsc::UnboundedSender<String>,
    closed: Arc<AtomicBool>,
}

impl Connection for MockConnection {
    async fn send_text(&self, text: &str) -> Result<(), TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::ConnectionClosed("closed".into()));
        }
        self.sent
            .send(text.to_string())
            .map_err(|_| TransportError::ConnectionClosed("server gone".into()))
    }

    async fn recv(&self) -> Result<Inbound, TransportError> {
        match self.inbound.lock().await.recv().await {
            Some(frame) => frame,
            None => Ok(Inbound::Closed(None)),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

/// The server's end of one accepted mock connection.
pub struct MockServer {
    pub target: String,
    to_client: mpsc::UnboundedSender<Result<Inbound, TransportError>>,
    from_client: mpsc::UnboundedReceiver<String>,
    closed: Arc<AtomicBool>,
}

impl MockServer {
    /// Sends a text frame to the client.
    pub fn push(&self, payload: &str) {
        let _ = self
            .to_client
            .send(Ok(Inbound::Payload(payload.as_bytes().to_vec())));
    }

    /// Sends a chat message JSON frame.
    pub fn say(&self, content: &str, room: &str, username: &str) {
        self.push(&format!(
            r#"{{"content":"{content}","room_id":"{room}","username":"{username}"}}"#
        ));
    }

    /// Closes from the server side with `code`.
    pub fn close(&self, code: Option<u16>) {
        let _ = self.to_client.send(Ok(Inbound::Closed(code)));
    }

    /// Fails the client's next read.
    pub fn fail(&self) {
        let _ = self.to_client.send(Err(TransportError::ReceiveFailed(
            std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
        )));
    }

    /// Next text the client sent, if any arrives within a second.
    pub async fn received(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(1), self.from_client.recv())
            .await
            .ok()
            .flatten()
    }

    /// Returns whatever the client has sent without waiting.
    pub fn try_received(&mut self) -> Option<String> {
        self.from_client.try_recv().ok()
    }

    /// Whether the client closed its end.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

// =========================================================================
// Helpers
// =========================================================================

pub fn context(room: &str, user: &str, name: &str) -> SessionContext {
    SessionContext::new(RoomId::new(room), Identity::new(user, name))
        .expect("valid context")
}

/// Waits for the next event; fails the test if none arrives in 30s of
/// (virtual) time or the task has stopped.
pub async fn next_event(conn: &mut RoomConnection) -> RoomEvent {
    tokio::time::timeout(Duration::from_secs(30), conn.next_event())
        .await
        .expect("timed out waiting for event")
        .expect("event stream ended")
}

/// Waits for the next accepted connection.
pub async fn accepted(
    servers: &mut mpsc::UnboundedReceiver<MockServer>,
) -> MockServer {
    tokio::time::timeout(Duration::from_secs(30), servers.recv())
        .await
        .expect("timed out waiting for connect")
        .expect("connector dropped")
}

/// Lets the connection task run until it has nothing left to do right now.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
