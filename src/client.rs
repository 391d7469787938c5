//! Async client for the Bombgrid protocol.
//!
//! [`BombgridClient`] is a thin handle that communicates with a background
//! transport loop task via an unbounded MPSC channel. Events are emitted on a
//! bounded channel ([`tokio::sync::mpsc::Receiver<BombgridEvent>`]) returned
//! from [`BombgridClient::start`].
//!
//! The loop owns the [`GameSession`] outright: inbound frames and local press
//! requests are serialized through one `tokio::select!`, which is what makes
//! the session's check-then-clear admission gate atomic with respect to other
//! local inputs.
//!
//! # Example
//!
//! ```rust,ignore
//! let transport = WebSocketTransport::connect("ws://127.0.0.1:3000/ws").await?;
//! let config = BombgridConfig::new().with_identity(42);
//! let (client, mut events) = BombgridClient::start(transport, config);
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         BombgridEvent::SlotChanged { index, display, .. } => { /* repaint */ }
//!         BombgridEvent::Disconnected { .. } => break,
//!         _ => {}
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, warn};

use crate::error::{BombgridError, Result};
use crate::event::BombgridEvent;
use crate::protocol::{ClientIdentity, MoveAction, ServerMessage, SlotIndex};
use crate::session::GameSession;
use crate::transport::Transport;

/// Default capacity of the bounded event channel.
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default timeout for the graceful shutdown.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Exclusive upper bound for the randomly defaulted client identity.
const RANDOM_IDENTITY_BOUND: ClientIdentity = 200;

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`BombgridClient`] connection.
///
/// All fields have defaults; in particular, leaving `identity` unset picks a
/// random identity in `[0, 200)`, mirroring the reference client's prompt
/// fallback.
///
/// # Example
///
/// ```
/// use bombgrid_client::client::BombgridConfig;
/// use std::time::Duration;
///
/// let config = BombgridConfig::new()
///     .with_identity(42)
///     .with_event_channel_capacity(512)
///     .with_shutdown_timeout(Duration::from_secs(5));
/// assert_eq!(config.identity, Some(42));
/// ```
#[derive(Debug, Clone)]
pub struct BombgridConfig {
    /// The identity announced once after bootstrap. `None` = random in
    /// `[0, 200)`, chosen at [`BombgridClient::start`].
    pub identity: Option<ClientIdentity>,
    /// Capacity of the bounded event channel.
    ///
    /// When the consumer cannot keep up with incoming server frames, events
    /// are dropped (with a warning logged) to avoid blocking the transport
    /// loop. The `Disconnected` event is always delivered regardless of
    /// capacity.
    ///
    /// Defaults to **256**. Values below 1 are clamped to 1.
    pub event_channel_capacity: usize,
    /// Timeout for the graceful shutdown.
    ///
    /// When [`BombgridClient::shutdown`] is called, the background transport
    /// loop is given this much time to close the transport and emit a final
    /// `Disconnected` event. If the timeout expires the task is aborted.
    ///
    /// Defaults to **1 second**. A zero timeout aborts the transport loop
    /// immediately without waiting for graceful shutdown.
    pub shutdown_timeout: Duration,
}

impl BombgridConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            identity: None,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Set an explicit client identity instead of the random default.
    #[must_use]
    pub fn with_identity(mut self, identity: ClientIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Set the capacity of the bounded event channel.
    ///
    /// Defaults to **256**. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }

    /// Set the timeout for the graceful shutdown.
    ///
    /// Defaults to **1 second**. A zero timeout aborts the transport loop
    /// immediately without waiting for graceful shutdown.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

impl Default for BombgridConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ── Shared state ────────────────────────────────────────────────────

/// Internal shared state between the client handle and the transport loop.
struct ClientState {
    connected: AtomicBool,
    active: AtomicBool,
    slot_count: AtomicUsize,
    player_name: Mutex<Option<String>>,
    player_color: Mutex<Option<String>>,
}

impl ClientState {
    fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            active: AtomicBool::new(false),
            slot_count: AtomicUsize::new(0),
            player_name: Mutex::new(None),
            player_color: Mutex::new(None),
        }
    }
}

/// Local input commands queued from the handle to the transport loop.
///
/// Admission control happens *inside* the loop (against the session's
/// clickable gate), never in the handle, so a `status` frame interleaved
/// ahead of a press wins — last writer wins on the gate.
#[derive(Debug)]
enum Command {
    Press {
        index: SlotIndex,
        action: MoveAction,
    },
}

// ── Client handle ───────────────────────────────────────────────────

/// Async client handle for the Bombgrid protocol.
///
/// Created via [`BombgridClient::start`], which spawns a background transport
/// loop and returns this handle together with an event receiver.
///
/// [`press`](Self::press) queues a press request to the transport loop and
/// returns immediately once queued (no round-trip await); whether a `move`
/// frame actually goes out depends on the slot's clickable gate at the moment
/// the loop processes the request.
pub struct BombgridClient {
    /// Sender half of the command channel to the transport loop.
    cmd_tx: mpsc::UnboundedSender<Command>,
    /// Shared state updated by the transport loop.
    state: Arc<ClientState>,
    /// The identity this connection announces at bootstrap.
    identity: ClientIdentity,
    /// Handle to the background transport loop task.
    task: Option<tokio::task::JoinHandle<()>>,
    /// Oneshot sender to signal the transport loop to shut down gracefully.
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    /// Timeout for the graceful shutdown.
    shutdown_timeout: Duration,
}

impl BombgridClient {
    /// Start the client transport loop and return a handle plus event
    /// receiver.
    ///
    /// The loop waits for the server's bootstrap frame and announces the
    /// configured (or randomly chosen) identity exactly once in response.
    ///
    /// # Arguments
    ///
    /// * `transport` — A connected [`Transport`] implementation.
    /// * `config` — Client configuration.
    ///
    /// # Returns
    ///
    /// A tuple of `(client_handle, event_receiver)`. The event receiver
    /// yields [`BombgridEvent`]s until the transport closes or the client
    /// shuts down.
    #[must_use = "the event receiver must be used to receive events"]
    pub fn start(
        transport: impl Transport,
        config: BombgridConfig,
    ) -> (Self, mpsc::Receiver<BombgridEvent>) {
        let identity = config
            .identity
            .unwrap_or_else(|| rand::thread_rng().gen_range(0..RANDOM_IDENTITY_BOUND));

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<Command>();
        // Clamp capacity to at least 1 (tokio panics on 0).
        let capacity = config.event_channel_capacity.max(1);
        let (event_tx, event_rx) = mpsc::channel::<BombgridEvent>(capacity);
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let state = Arc::new(ClientState::new());
        let loop_state = Arc::clone(&state);

        let task = tokio::spawn(transport_loop(
            transport,
            GameSession::new(identity),
            cmd_rx,
            event_tx,
            loop_state,
            shutdown_rx,
        ));

        let client = Self {
            cmd_tx,
            state,
            identity,
            task: Some(task),
            shutdown_tx: Some(shutdown_tx),
            shutdown_timeout: config.shutdown_timeout,
        };

        (client, event_rx)
    }

    // ── Public API methods ──────────────────────────────────────────

    /// Activate one of a slot's directional affordances.
    ///
    /// The press is admitted or discarded by the transport loop against the
    /// slot's clickable gate; a discarded press produces no frame and no
    /// event.
    ///
    /// # Errors
    ///
    /// Returns [`BombgridError::NotConnected`] if the transport has closed.
    pub fn press(&self, index: SlotIndex, action: MoveAction) -> Result<()> {
        self.send(Command::Press { index, action })
    }

    /// Shut down the client, closing the transport and stopping the
    /// background task.
    ///
    /// After calling this method, the event receiver will yield `None` once
    /// the transport loop exits.
    pub async fn shutdown(&mut self) {
        debug!("BombgridClient: shutdown requested");

        // Signal the transport loop to shut down gracefully.
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        // Await the transport loop with a timeout. If it doesn't exit in
        // time, abort it so the task cannot detach and run indefinitely.
        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!("transport loop terminated with join error: {join_err}");
                }
                Err(_) => {
                    warn!("transport loop did not exit within timeout; aborting task");
                    task.abort();
                    if let Err(join_err) = task.await {
                        debug!("transport loop aborted: {join_err}");
                    }
                }
            }
        }

        self.state.connected.store(false, Ordering::Release);
    }

    // ── State accessors ─────────────────────────────────────────────

    /// The identity this connection announces at bootstrap.
    pub fn identity(&self) -> ClientIdentity {
        self.identity
    }

    /// Returns `true` if the transport is believed to be connected.
    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::Acquire)
    }

    /// Returns `true` once the bootstrap frame has been processed.
    pub fn is_active(&self) -> bool {
        self.state.active.load(Ordering::Acquire)
    }

    /// The number of slots allocated at bootstrap (0 before bootstrap).
    pub fn slot_count(&self) -> usize {
        self.state.slot_count.load(Ordering::Acquire)
    }

    /// The display name the server assigned this client, if any yet.
    pub async fn player_name(&self) -> Option<String> {
        self.state.player_name.lock().await.clone()
    }

    /// The color token the server assigned this client, if any yet.
    pub async fn player_color(&self) -> Option<String> {
        self.state.player_color.lock().await.clone()
    }

    // ── Internal helpers ────────────────────────────────────────────

    /// Queue a command to the transport loop.
    fn send(&self, cmd: Command) -> Result<()> {
        if !self.state.connected.load(Ordering::Acquire) {
            return Err(BombgridError::NotConnected);
        }
        self.cmd_tx
            .send(cmd)
            .map_err(|_| BombgridError::NotConnected)
    }
}

impl std::fmt::Debug for BombgridClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BombgridClient")
            .field("identity", &self.identity)
            .field("connected", &self.is_connected())
            .field("active", &self.is_active())
            .field("slot_count", &self.slot_count())
            .field("has_task", &self.task.is_some())
            .finish()
    }
}

impl Drop for BombgridClient {
    fn drop(&mut self) {
        // `Drop` is synchronous so we cannot await a graceful shutdown.
        // The only safe action is to abort the spawned task, which causes
        // the transport loop future to be dropped immediately.  The
        // `shutdown_tx` oneshot is intentionally *not* sent here: sending
        // it would trigger a graceful path that calls async `transport.close()`,
        // but there is no executor context to drive it inside `Drop`.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ── Transport loop ──────────────────────────────────────────────────

/// Background transport loop that multiplexes send/receive via
/// `tokio::select!`.
///
/// Exits when:
/// - The command channel closes (client handle dropped or shutdown called)
/// - The transport returns `None` (server closed connection)
/// - A transport error occurs
/// - The session reports a fatal protocol mismatch (out-of-range slot index)
async fn transport_loop(
    mut transport: impl Transport,
    mut session: GameSession,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: mpsc::Sender<BombgridEvent>,
    state: Arc<ClientState>,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) {
    debug!(identity = session.identity(), "transport loop started");

    // Emit the synthetic Connected event before entering the select loop.
    emit_event(&event_tx, BombgridEvent::Connected).await;

    loop {
        tokio::select! {
            // Branch 1: local input command from the client handle
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(Command::Press { index, action }) => {
                        // The clickable gate lives in the session; a press
                        // that loses the race against an interleaved status
                        // frame is simply discarded here.
                        let Some(msg) = session.press(index, action) else {
                            continue;
                        };
                        if let Err(e) = transport.send(msg.encode()).await {
                            error!("transport send error: {e}");
                            emit_disconnected(
                                &event_tx,
                                &state,
                                Some(format!("transport send error: {e}")),
                            ).await;
                            break;
                        }
                        emit_event(&event_tx, BombgridEvent::MoveSent { index, action }).await;
                    }
                    // Command channel closed — client handle dropped.
                    None => {
                        debug!("command channel closed, shutting down transport loop");
                        let _ = transport.close().await;
                        emit_disconnected(&event_tx, &state, Some("client shut down".into())).await;
                        break;
                    }
                }
            }

            // Branch 2: shutdown signal
            _ = &mut shutdown_rx => {
                debug!("shutdown signal received");
                let _ = transport.close().await;
                emit_disconnected(&event_tx, &state, Some("client shut down".into())).await;
                break;
            }

            // Branch 3: incoming frame from the server
            incoming = transport.recv() => {
                match incoming {
                    Some(Ok(frame)) => {
                        let msg = match ServerMessage::decode(&frame) {
                            Ok(msg) => msg,
                            Err(e) => {
                                // Malformed frames are dropped, not fatal.
                                warn!("failed to decode frame: {e} — raw: {frame:?}");
                                continue;
                            }
                        };
                        match session.apply(msg) {
                            Ok(outcome) => {
                                if let Some(event) = &outcome.event {
                                    update_state(&state, event).await;
                                }
                                if let Some(reply) = outcome.reply {
                                    if let Err(e) = transport.send(reply.encode()).await {
                                        error!("transport send error: {e}");
                                        emit_disconnected(
                                            &event_tx,
                                            &state,
                                            Some(format!("transport send error: {e}")),
                                        ).await;
                                        break;
                                    }
                                }
                                if let Some(event) = outcome.event {
                                    emit_event(&event_tx, event).await;
                                }
                            }
                            // A protocol/implementation mismatch (slot index
                            // beyond the bootstrapped count) is a client bug,
                            // not a recoverable condition.
                            Err(e) => {
                                error!("fatal protocol error: {e}");
                                let _ = transport.close().await;
                                emit_disconnected(&event_tx, &state, Some(e.to_string())).await;
                                break;
                            }
                        }
                    }
                    Some(Err(e)) => {
                        error!("transport receive error: {e}");
                        emit_disconnected(
                            &event_tx,
                            &state,
                            Some(format!("transport receive error: {e}")),
                        ).await;
                        break;
                    }
                    // Transport closed cleanly.
                    None => {
                        debug!("transport closed by server");
                        emit_disconnected(&event_tx, &state, None).await;
                        break;
                    }
                }
            }
        }
    }

    debug!("transport loop exited");
}

/// Update shared [`ClientState`] based on a session event.
async fn update_state(state: &ClientState, event: &BombgridEvent) {
    match event {
        BombgridEvent::SlotsReady { count } => {
            state.active.store(true, Ordering::Release);
            state.slot_count.store(*count as usize, Ordering::Release);
            debug!(count, "state: active");
        }
        BombgridEvent::NameAssigned { name, color } => {
            *state.player_name.lock().await = Some(name.clone());
            *state.player_color.lock().await = Some(color.clone());
            debug!(%name, %color, "state: name assigned");
        }
        _ => {}
    }
}

/// Emit an event to the event channel. If the channel is full, log a warning
/// and drop the event to avoid blocking the transport loop.
async fn emit_event(event_tx: &mpsc::Sender<BombgridEvent>, event: BombgridEvent) {
    match event_tx.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(dropped)) => {
            warn!(
                "event channel full, dropping event: {:?}",
                std::mem::discriminant(&dropped)
            );
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("event channel closed, receiver dropped");
        }
    }
}

/// Emit a [`Disconnected`](BombgridEvent::Disconnected) event and update state.
///
/// Uses `send().await` (blocking) instead of `try_send` because `Disconnected`
/// is always the last event on the channel and must never be silently dropped.
async fn emit_disconnected(
    event_tx: &mpsc::Sender<BombgridEvent>,
    state: &ClientState,
    reason: Option<String>,
) {
    state.connected.store(false, Ordering::Release);
    state.active.store(false, Ordering::Release);
    let event = BombgridEvent::Disconnected { reason };
    if event_tx.send(event).await.is_err() {
        debug!("event channel closed, receiver dropped");
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::protocol::ClientMessage;
    use crate::session::DisplayState;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    // ── Mock transport ──────────────────────────────────────────────

    /// A mock transport that records sent frames and replays scripted
    /// responses.
    struct MockTransport {
        /// Frames that `recv()` will yield in order.
        incoming: VecDeque<Option<std::result::Result<String, BombgridError>>>,
        /// Recorded outgoing frames.
        sent: Arc<StdMutex<Vec<String>>>,
        /// Whether `close()` was called.
        closed: Arc<AtomicBool>,
    }

    impl MockTransport {
        fn new(
            incoming: Vec<Option<std::result::Result<String, BombgridError>>>,
        ) -> (Self, Arc<StdMutex<Vec<String>>>, Arc<AtomicBool>) {
            let sent = Arc::new(StdMutex::new(Vec::new()));
            let closed = Arc::new(AtomicBool::new(false));
            let transport = Self {
                incoming: VecDeque::from(incoming),
                sent: Arc::clone(&sent),
                closed: Arc::clone(&closed),
            };
            (transport, sent, closed)
        }

        fn scripted(frames: &[&str]) -> (Self, Arc<StdMutex<Vec<String>>>, Arc<AtomicBool>) {
            Self::new(frames.iter().map(|f| Some(Ok((*f).to_string()))).collect())
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&mut self, frame: String) -> std::result::Result<(), BombgridError> {
            self.sent.lock().unwrap().push(frame);
            Ok(())
        }

        async fn recv(&mut self) -> Option<std::result::Result<String, BombgridError>> {
            if let Some(item) = self.incoming.pop_front() {
                // An explicit `None` entry signals a clean transport close;
                // `Some(result)` delivers the scripted frame or error.
                item
            } else {
                // All scripted frames have been delivered — hang forever
                // so the transport loop stays alive until shutdown.
                std::future::pending().await
            }
        }

        async fn close(&mut self) -> std::result::Result<(), BombgridError> {
            self.closed.store(true, Ordering::Relaxed);
            Ok(())
        }
    }

    fn config() -> BombgridConfig {
        BombgridConfig::new().with_identity(42)
    }

    // ── Tests ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn connected_is_first_event() {
        let (transport, _sent, _closed) = MockTransport::scripted(&["hello\n3"]);
        let (mut client, mut events) = BombgridClient::start(transport, config());

        let first = events.recv().await.unwrap();
        assert!(
            matches!(first, BombgridEvent::Connected),
            "expected Connected as first event, got {first:?}"
        );

        client.shutdown().await;
    }

    #[tokio::test]
    async fn hello_bootstraps_and_announces_identity() {
        let (transport, sent, _closed) = MockTransport::scripted(&["hello\n3"]);
        let (mut client, mut events) = BombgridClient::start(transport, config());

        let _ = events.recv().await; // Connected
        let event = events.recv().await.unwrap();
        assert_eq!(event, BombgridEvent::SlotsReady { count: 3 });

        assert!(client.is_active());
        assert_eq!(client.slot_count(), 3);

        {
            let frames = sent.lock().unwrap();
            assert_eq!(frames.as_slice(), ["olleh\n42"]);
        }

        client.shutdown().await;
    }

    #[tokio::test]
    async fn press_on_clickable_slot_sends_move_frame() {
        let (transport, sent, _closed) = MockTransport::scripted(&["hello\n3", "status\n1 X"]);
        let (mut client, mut events) = BombgridClient::start(transport, config());

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // SlotsReady
        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            BombgridEvent::SlotChanged {
                index: 1,
                display: DisplayState::Defused,
            }
        );

        client.press(1, MoveAction::StrongLeft).unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            BombgridEvent::MoveSent {
                index: 1,
                action: MoveAction::StrongLeft,
            }
        );

        {
            let frames = sent.lock().unwrap();
            let last = frames.last().unwrap();
            assert_eq!(last, "move\n1 L3");
            assert_eq!(
                ClientMessage::decode(last).unwrap(),
                ClientMessage::Move {
                    index: 1,
                    action: MoveAction::StrongLeft,
                }
            );
        }

        client.shutdown().await;
    }

    #[tokio::test]
    async fn press_on_non_clickable_slot_sends_nothing() {
        let (transport, sent, _closed) = MockTransport::scripted(&["hello\n3"]);
        let (mut client, mut events) = BombgridClient::start(transport, config());

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // SlotsReady

        client.press(0, MoveAction::WeakRight).unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        {
            let frames = sent.lock().unwrap();
            // Only the identity announcement went out.
            assert_eq!(frames.as_slice(), ["olleh\n42"]);
        }

        client.shutdown().await;
    }

    #[tokio::test]
    async fn second_press_before_rearm_is_discarded() {
        let (transport, sent, _closed) = MockTransport::scripted(&["hello\n3", "status\n1 X"]);
        let (mut client, mut events) = BombgridClient::start(transport, config());

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // SlotsReady
        let _ = events.recv().await; // SlotChanged

        client.press(1, MoveAction::StrongLeft).unwrap();
        client.press(1, MoveAction::StrongLeft).unwrap();

        let event = events.recv().await.unwrap();
        assert!(matches!(event, BombgridEvent::MoveSent { .. }));

        tokio::time::sleep(Duration::from_millis(50)).await;

        {
            let frames = sent.lock().unwrap();
            // Exactly one move frame despite two presses.
            assert_eq!(frames.as_slice(), ["olleh\n42", "move\n1 L3"]);
        }

        client.shutdown().await;
    }

    #[tokio::test]
    async fn name_frame_updates_shared_state() {
        let (transport, _sent, _closed) =
            MockTransport::scripted(&["hello\n1", "name\nAlice\n#ff0000"]);
        let (mut client, mut events) = BombgridClient::start(transport, config());

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // SlotsReady
        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            BombgridEvent::NameAssigned {
                name: "Alice".into(),
                color: "#ff0000".into(),
            }
        );

        assert_eq!(client.player_name().await.as_deref(), Some("Alice"));
        assert_eq!(client.player_color().await.as_deref(), Some("#ff0000"));

        client.shutdown().await;
    }

    #[tokio::test]
    async fn board_frame_emits_scoreboard_event() {
        let (transport, _sent, _closed) =
            MockTransport::scripted(&["hello\n1", "board\nAlice\n#f00\n12\nBob\n#0f0\n7"]);
        let (mut client, mut events) = BombgridClient::start(transport, config());

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // SlotsReady
        let event = events.recv().await.unwrap();
        let BombgridEvent::ScoreboardUpdated { entries } = event else {
            panic!("expected ScoreboardUpdated, got {event:?}");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Alice");
        assert_eq!(entries[1].score, "7");

        client.shutdown().await;
    }

    #[tokio::test]
    async fn malformed_frame_is_skipped_without_killing_the_loop() {
        // "hello" with missing count is malformed; the loop must survive and
        // bootstrap from the next, well-formed frame.
        let (transport, sent, _closed) = MockTransport::scripted(&["hello", "hello\n2"]);
        let (mut client, mut events) = BombgridClient::start(transport, config());

        let _ = events.recv().await; // Connected
        let event = events.recv().await.unwrap();
        assert_eq!(event, BombgridEvent::SlotsReady { count: 2 });

        {
            let frames = sent.lock().unwrap();
            assert_eq!(frames.as_slice(), ["olleh\n42"]);
        }

        client.shutdown().await;
    }

    #[tokio::test]
    async fn unrecognized_command_is_ignored() {
        let (transport, _sent, _closed) =
            MockTransport::scripted(&["hello\n1", "goodbye\nworld", "status\n0 X"]);
        let (mut client, mut events) = BombgridClient::start(transport, config());

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // SlotsReady
        // The unrecognized frame produces no event; next is the status.
        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            BombgridEvent::SlotChanged {
                index: 0,
                display: DisplayState::Defused,
            }
        );

        client.shutdown().await;
    }

    #[tokio::test]
    async fn out_of_range_status_is_fatal() {
        let (transport, _sent, closed) = MockTransport::scripted(&["hello\n2", "status\n5 X"]);
        let (mut client, mut events) = BombgridClient::start(transport, config());

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // SlotsReady
        let event = events.recv().await.unwrap();
        let BombgridEvent::Disconnected { reason } = event else {
            panic!("expected Disconnected, got {event:?}");
        };
        assert!(reason.unwrap().contains("out of range"));

        assert!(!client.is_connected());
        assert!(closed.load(Ordering::Relaxed));

        client.shutdown().await;
    }

    #[tokio::test]
    async fn disconnected_on_transport_close() {
        let (transport, _sent, _closed) =
            MockTransport::new(vec![Some(Ok("hello\n1".into())), None]);
        let (mut client, mut events) = BombgridClient::start(transport, config());

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // SlotsReady
        let event = events.recv().await.unwrap();
        assert!(matches!(event, BombgridEvent::Disconnected { reason: None }));

        assert!(!client.is_connected());
        assert!(!client.is_active());

        client.shutdown().await;
    }

    #[tokio::test]
    async fn transport_recv_error_emits_disconnected() {
        let (transport, _sent, _closed) = MockTransport::new(vec![Some(Err(
            BombgridError::TransportReceive("boom".into()),
        ))]);
        let (mut client, mut events) = BombgridClient::start(transport, config());

        let _ = events.recv().await; // Connected
        let event = events.recv().await.unwrap();
        let BombgridEvent::Disconnected { reason } = event else {
            panic!("expected Disconnected, got {event:?}");
        };
        assert!(reason.unwrap().contains("boom"));

        client.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_emits_disconnected_and_closes_transport() {
        let (transport, _sent, closed) = MockTransport::scripted(&["hello\n1"]);
        let (mut client, mut events) = BombgridClient::start(transport, config());

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // SlotsReady

        client.shutdown().await;

        let event = events.recv().await.unwrap();
        let BombgridEvent::Disconnected { reason } = event else {
            panic!("expected Disconnected, got {event:?}");
        };
        assert_eq!(reason.as_deref(), Some("client shut down"));
        assert!(closed.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn press_after_shutdown_returns_not_connected() {
        let (transport, _sent, _closed) = MockTransport::scripted(&["hello\n1"]);
        let (mut client, mut events) = BombgridClient::start(transport, config());

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // SlotsReady

        client.shutdown().await;

        let result = client.press(0, MoveAction::StrongLeft);
        assert!(matches!(result, Err(BombgridError::NotConnected)));
    }

    #[tokio::test]
    async fn random_identity_is_within_bounds() {
        let (transport, _sent, _closed) = MockTransport::scripted(&[]);
        let (mut client, mut events) = BombgridClient::start(transport, BombgridConfig::new());

        assert!(client.identity() < RANDOM_IDENTITY_BOUND);

        let _ = events.recv().await; // Connected
        client.shutdown().await;
    }

    #[tokio::test]
    async fn config_defaults() {
        let config = BombgridConfig::new();
        assert!(config.identity.is_none());
        assert_eq!(config.event_channel_capacity, 256);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn config_builder_methods() {
        let config = BombgridConfig::new()
            .with_identity(7)
            .with_event_channel_capacity(512)
            .with_shutdown_timeout(Duration::from_secs(5));
        assert_eq!(config.identity, Some(7));
        assert_eq!(config.event_channel_capacity, 512);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn event_channel_capacity_is_clamped_to_one() {
        let config = BombgridConfig::new().with_event_channel_capacity(0);
        assert_eq!(config.event_channel_capacity, 1);
    }

    #[tokio::test]
    async fn small_event_channel_drops_events_but_delivers_disconnected() {
        // Capacity 1 with a burst of status frames — some SlotChanged events
        // are dropped, but Disconnected always arrives.
        let mut incoming: Vec<Option<std::result::Result<String, BombgridError>>> = Vec::new();
        incoming.push(Some(Ok("hello\n1".into())));
        for _ in 0..20 {
            incoming.push(Some(Ok("status\n0 X".into())));
        }
        incoming.push(None);

        let (transport, _sent, _closed) = MockTransport::new(incoming);
        let (mut client, mut events) =
            BombgridClient::start(transport, config().with_event_channel_capacity(1));

        // Let the channel fill up and events get dropped.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut count = 0;
        let mut saw_disconnected = false;
        while let Some(event) = events.recv().await {
            if matches!(event, BombgridEvent::Disconnected { .. }) {
                saw_disconnected = true;
            }
            count += 1;
        }
        // Connected + 1 SlotsReady + 20 SlotChanged + Disconnected = 23
        // possible; with a single-slot channel some must have been dropped.
        assert!(saw_disconnected, "Disconnected must never be dropped");
        assert!(count < 23, "expected backpressure to drop events, got all {count}");

        client.shutdown().await;
    }

    #[tokio::test]
    async fn double_shutdown_does_not_panic() {
        let (transport, _sent, _closed) = MockTransport::scripted(&["hello\n1"]);
        let (mut client, mut events) = BombgridClient::start(transport, config());

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // SlotsReady

        client.shutdown().await;
        client.shutdown().await; // should not panic
    }

    #[tokio::test]
    async fn drop_without_explicit_shutdown() {
        let (transport, _sent, _closed) = MockTransport::scripted(&["hello\n1"]);
        let (client, mut events) = BombgridClient::start(transport, config());

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // SlotsReady

        // Drop the client without calling shutdown.
        drop(client);

        // The transport loop should eventually exit; the event channel will
        // close. We just verify we don't hang or panic.
        while let Some(_event) = events.recv().await {}
    }

    #[tokio::test]
    async fn debug_impl_for_client() {
        let (transport, _sent, _closed) = MockTransport::scripted(&["hello\n1"]);
        let (mut client, mut events) = BombgridClient::start(transport, config());

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // SlotsReady

        let debug_str = format!("{client:?}");
        assert!(debug_str.contains("BombgridClient"));
        assert!(debug_str.contains("connected"));

        client.shutdown().await;
    }
}
