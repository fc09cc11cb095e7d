//! Room connection actor: an isolated Tokio task that owns one room's
//! socket.
//!
//! The task is the only writer of the retry counter, the message log and
//! the connection state. The owner talks to it through a command channel
//! and hears back through a bounded event channel. An owner that never
//! reads events only loses the oldest ones; the message log stays the
//! source of truth. Disposal is a flag plus a `Shutdown` command; every
//! wait point in the task (connecting, reading, backing off) listens for
//! it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use roomwire_protocol::{
    classify_close, classify_rejection, join_room_target, ChatMessage,
    CloseKind, Codec, JsonCodec, RoomId,
};
use roomwire_retry::{Backoff, RetryState};
use roomwire_session::SessionContext;
use roomwire_transport::{Connection, Connector, Inbound};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use crate::{
    ConnectionConfig, ConnectionState, MessageLog, RoomError, RoomEvent,
};

/// Observer called for every event a connection publishes, before the
/// event is queued for the owner.
pub type EventHook = Arc<dyn Fn(&RoomId, &RoomEvent) + Send + Sync>;

/// Commands sent from the handle to the connection task.
enum Command {
    /// Transmit a text frame, if the socket is still open.
    Send(String),
    /// Stop for good.
    Shutdown,
}

/// How a connect attempt or an open socket ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// The owner disposed the connection.
    Disposed,
    /// The room is gone. Carries the close code, if there was one.
    Terminal(Option<u16>),
    /// Network-level loss. Carries the close code, if there was one.
    Transient(Option<u16>),
}

impl Outcome {
    fn from_close(code: Option<u16>) -> Self {
        match classify_close(code) {
            CloseKind::Terminal => Self::Terminal(code),
            CloseKind::Transient => Self::Transient(code),
        }
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Handle to a running room connection.
///
/// Dropping the handle disposes the connection.
pub struct RoomConnection {
    context: SessionContext,
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Receiver<RoomEvent>,
    state: watch::Receiver<ConnectionState>,
    log: MessageLog,
    active: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl RoomConnection {
    /// Starts a connection task for `context`.
    ///
    /// Must be called from within a Tokio runtime. Never fails: connect
    /// problems are reported as [`RoomEvent`]s. Validate `config` with
    /// [`ConnectionConfig::validate`] beforehand.
    pub fn spawn<C: Connector>(
        connector: Arc<C>,
        context: SessionContext,
        config: &ConnectionConfig,
        hook: Option<EventHook>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) =
            broadcast::channel(config.event_capacity.max(1));
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        let log = MessageLog::new(config.retention);
        let active = Arc::new(AtomicBool::new(true));
        let finished = Arc::new(AtomicBool::new(false));

        let target = join_room_target(
            &config.base_url,
            &context.room_id,
            &context.user_id,
            &context.username,
        );

        let actor = ConnectionActor {
            connector,
            room_id: context.room_id.clone(),
            target,
            codec: JsonCodec,
            retry: RetryState::new(config.retry.clone()),
            log: log.clone(),
            state: state_tx,
            events: event_tx,
            hook,
            active: Arc::clone(&active),
            finished: Arc::clone(&finished),
            commands: cmd_rx,
        };

        let task = tokio::spawn(actor.run());

        Self {
            context,
            commands: cmd_tx,
            events: event_rx,
            state: state_rx,
            log,
            active,
            finished,
            task: Some(task),
        }
    }

    /// Transmits `text` verbatim if the socket is open; otherwise drops it.
    ///
    /// Never blocks and never fails. Nothing is queued for later.
    pub fn send(&self, text: impl Into<String>) {
        if !self.is_open() {
            tracing::debug!(
                room_id = %self.context.room_id,
                state = %self.state(),
                "dropping send, connection not open"
            );
            return;
        }
        let _ = self.commands.send(Command::Send(text.into()));
    }

    /// Returns `true` if [`send`](Self::send) would transmit right now.
    pub fn is_open(&self) -> bool {
        self.active.load(Ordering::Acquire) && self.state.borrow().is_open()
    }

    /// Current socket phase.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// A receiver that observes every state transition.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Snapshot of every message received so far, in arrival order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.log.snapshot()
    }

    /// The shared message log.
    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// The context this connection is bound to.
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Waits for the next event. Returns `None` once the task has stopped
    /// and every event has been read.
    ///
    /// Events the owner fell too far behind on are skipped.
    pub async fn next_event(&mut self) -> Option<RoomEvent> {
        loop {
            match self.events.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => self.lagged(skipped),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next event if one is already queued.
    pub fn try_next_event(&mut self) -> Option<RoomEvent> {
        loop {
            match self.events.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => self.lagged(skipped),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Number of events queued and not yet read. Never exceeds the
    /// configured event capacity.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    fn lagged(&self, skipped: u64) {
        tracing::debug!(
            room_id = %self.context.room_id,
            skipped,
            "event reader lagged, oldest events skipped"
        );
    }

    /// Stops the connection: cancels any pending reconnect and closes the
    /// socket. Idempotent.
    pub fn dispose(&self) {
        // Flip the flag before anything else so a close caused by this
        // disposal is never mistaken for a transient one.
        if self.active.swap(false, Ordering::AcqRel) {
            tracing::debug!(
                room_id = %self.context.room_id,
                "disposing room connection"
            );
            let _ = self.commands.send(Command::Shutdown);
        }
    }

    /// Returns `true` once [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        !self.active.load(Ordering::Acquire)
    }

    /// Returns `true` once the task has given up for good: the room is
    /// unavailable, the retry budget is spent, or a disposed task has
    /// stopped. Set before any terminal event is published.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Disposes the connection and waits for its task to finish.
    pub async fn closed(mut self) -> Result<(), RoomError> {
        self.dispose();
        match self.task.take() {
            Some(task) => task.await.map_err(|e| {
                RoomError::TaskFailed(self.context.room_id.clone(), e.to_string())
            }),
            None => Ok(()),
        }
    }
}

impl Drop for RoomConnection {
    fn drop(&mut self) {
        self.dispose();
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// The internal connection state. Runs inside a Tokio task.
struct ConnectionActor<C: Connector> {
    connector: Arc<C>,
    room_id: RoomId,
    target: String,
    codec: JsonCodec,
    retry: RetryState,
    log: MessageLog,
    state: watch::Sender<ConnectionState>,
    events: broadcast::Sender<RoomEvent>,
    hook: Option<EventHook>,
    active: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl<C: Connector> ConnectionActor<C> {
    /// Connects, pumps, and reconnects until disposed or done.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room connection started");

        loop {
            let outcome = match self.open().await {
                Ok(conn) => {
                    let outcome = self.pump(&conn).await;
                    // Whatever ended the pump, the socket is closed here
                    // rather than left half-open.
                    if let Err(e) = conn.close().await {
                        tracing::trace!(
                            room_id = %self.room_id,
                            error = %e,
                            "close after pump failed"
                        );
                    }
                    outcome
                }
                Err(outcome) => outcome,
            };
            self.set_state(ConnectionState::Closed);

            if !self.is_active() {
                break;
            }

            match outcome {
                Outcome::Disposed => break,
                Outcome::Terminal(code) => {
                    tracing::warn!(
                        room_id = %self.room_id,
                        ?code,
                        "room unavailable, not reconnecting"
                    );
                    self.finish();
                    self.emit(RoomEvent::Unavailable { code });
                    break;
                }
                Outcome::Transient(code) => {
                    let Some(backoff) = self.retry.next_backoff() else {
                        let attempts = self.retry.attempt();
                        tracing::warn!(
                            room_id = %self.room_id,
                            attempts,
                            "reconnect budget exhausted"
                        );
                        self.finish();
                        self.emit(RoomEvent::RetriesExhausted { attempts });
                        break;
                    };
                    tracing::info!(
                        room_id = %self.room_id,
                        ?code,
                        attempt = backoff.attempt,
                        delay_ms = backoff.delay.as_millis() as u64,
                        "connection lost, scheduling reconnect"
                    );
                    self.emit(RoomEvent::Reconnecting {
                        attempt: backoff.attempt,
                        delay: backoff.delay,
                    });
                    if !self.wait(backoff).await {
                        break;
                    }
                }
            }
        }

        self.set_state(ConnectionState::Closed);
        self.finish();
        tracing::info!(room_id = %self.room_id, "room connection stopped");
    }

    /// Dials the target. Sends issued meanwhile are dropped.
    async fn open(&mut self) -> Result<C::Connection, Outcome> {
        if !self.is_active() {
            return Err(Outcome::Disposed);
        }
        self.set_state(ConnectionState::Connecting);
        tracing::debug!(
            room_id = %self.room_id,
            attempt = self.retry.attempt(),
            "connecting"
        );

        let connector = Arc::clone(&self.connector);
        let target = self.target.clone();
        let result = {
            let connect = connector.connect(&target);
            tokio::pin!(connect);
            loop {
                tokio::select! {
                    biased;
                    cmd = self.commands.recv() => match cmd {
                        Some(Command::Send(_)) => tracing::debug!(
                            room_id = %self.room_id,
                            "dropping send while connecting"
                        ),
                        Some(Command::Shutdown) | None => {
                            return Err(Outcome::Disposed);
                        }
                    },
                    result = &mut connect => break result,
                }
            }
        };

        match result {
            Ok(conn) => {
                if !self.is_active() {
                    let _ = conn.close().await;
                    return Err(Outcome::Disposed);
                }
                self.retry.reset();
                self.set_state(ConnectionState::Open);
                tracing::info!(
                    room_id = %self.room_id,
                    conn = %conn.id(),
                    "room connection open"
                );
                self.emit(RoomEvent::Opened);
                Ok(conn)
            }
            Err(e) => {
                tracing::debug!(
                    room_id = %self.room_id,
                    error = %e,
                    "connect failed"
                );
                match e.rejection_status().map(classify_rejection) {
                    Some(CloseKind::Terminal) => Err(Outcome::Terminal(None)),
                    _ => Err(Outcome::Transient(None)),
                }
            }
        }
    }

    /// Handles frames and sends, one at a time, until the socket ends.
    async fn pump(&mut self, conn: &C::Connection) -> Outcome {
        loop {
            tokio::select! {
                biased;
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Send(text)) => {
                        if let Err(e) = conn.send_text(&text).await {
                            tracing::debug!(
                                room_id = %self.room_id,
                                error = %e,
                                "send failed, closing"
                            );
                            return Outcome::Transient(None);
                        }
                    }
                    Some(Command::Shutdown) | None => return Outcome::Disposed,
                },
                inbound = conn.recv() => match inbound {
                    Ok(Inbound::Payload(bytes)) => self.deliver(&bytes),
                    Ok(Inbound::Closed(code)) => {
                        tracing::debug!(
                            room_id = %self.room_id,
                            ?code,
                            "server closed connection"
                        );
                        return Outcome::from_close(code);
                    }
                    Err(e) => {
                        tracing::debug!(
                            room_id = %self.room_id,
                            error = %e,
                            "transport error, closing"
                        );
                        return Outcome::Transient(None);
                    }
                },
            }
        }
    }

    /// Waits out a backoff. Returns `false` if disposed meanwhile.
    async fn wait(&mut self, backoff: Backoff) -> bool {
        let sleep = backoff.wait();
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                biased;
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Send(_)) => tracing::debug!(
                        room_id = %self.room_id,
                        "dropping send while reconnecting"
                    ),
                    Some(Command::Shutdown) | None => return false,
                },
                _ = &mut sleep => return self.is_active(),
            }
        }
    }

    fn deliver(&self, bytes: &[u8]) {
        match self.codec.decode::<ChatMessage>(bytes) {
            Ok(msg) => {
                tracing::trace!(
                    room_id = %self.room_id,
                    from = %msg.username,
                    "message received"
                );
                self.log.push(msg.clone());
                self.emit(RoomEvent::Message(msg));
            }
            Err(e) => {
                tracing::debug!(
                    room_id = %self.room_id,
                    error = %e,
                    "dropping malformed payload"
                );
            }
        }
    }

    fn emit(&self, event: RoomEvent) {
        if let Some(hook) = &self.hook {
            hook(&self.room_id, &event);
        }
        // Fails only when the handle is gone; nobody is left to tell.
        let _ = self.events.send(event);
    }

    fn finish(&self) {
        self.finished.store(true, Ordering::Release);
    }

    fn set_state(&self, next: ConnectionState) {
        let prev = self.state.send_replace(next);
        if prev != next {
            tracing::trace!(room_id = %self.room_id, %prev, %next, "state");
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}
