//! TV session: connect/authorise handshake and the background event listener.
//!
//! # Lifecycle
//!
//! ```text
//! Connecting ──(caller opened Transport)──► AwaitingConnectEvent
//!                                               │
//!        ms.channel.connect ◄───────────────────┤───► Failed
//!               │                                     (Unauthorized,
//!               ▼                                      Disconnected,
//!          Authorized ──spawn listener──► Listening    UnexpectedEvent,
//!                                            │         Transport)
//!                        close() / fatal ────┴──► Closed
//! ```
//!
//! Opening the control endpoint makes the TV show an approval prompt.
//! [`Session::handshake`] then blocks on exactly one inbound frame, the TV's
//! verdict.  Only if that verdict is `ms.channel.connect` is a [`Session`]
//! created and the listener spawned, so no command can ever be sent before
//! authorisation.
//!
//! # Read/write split
//!
//! The [`FrameSource`] is read by the handshake and then moved into the
//! listener task; nothing else ever reads it.  The [`FrameSink`] is moved into
//! the [`CommandDispatcher`] and only written from the foreground.  The
//! listener reports its outcome through a `watch` channel.
//!
//! # Cancellation
//!
//! The listener waits on `select!` between a `oneshot` cancel signal and the
//! next receive, so [`Session::close`] never has to wait for a frame that may
//! never arrive on a dead connection.

use std::fmt;

use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use tv_remote_core::{decode_event, InboundEvent};

use crate::application::dispatch::{CommandDispatcher, CommandError};
use crate::application::transport::{FrameSource, Transport, TransportError};

/// Why the handshake did not produce a session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandshakeError {
    /// The user rejected the connection on the TV, or the TV's access policy
    /// denies it.  Approve the prompt and reconnect.
    #[error("connection unauthorized")]
    Unauthorized,

    /// The TV closed the channel before authorising.
    #[error("TV disconnected")]
    Disconnected,

    /// The first frame was not one of the three expected events.  Carries the
    /// event tag, or an excerpt of the frame if it did not decode.
    #[error("unexpected event type received: {0}")]
    UnexpectedEvent(String),

    /// The connection failed while waiting for the verdict.
    #[error("transport error during handshake: {0}")]
    Transport(#[from] TransportError),
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// `ms.channel.unauthorized` arrived after authorisation.
    Unauthorized,
    /// `ms.channel.clientDisconnect` arrived.
    Disconnected,
    /// Reading from the connection failed.
    TransportLost(String),
    /// The owner closed the session.
    Cancelled,
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::Unauthorized => write!(f, "authorization revoked by the TV"),
            SessionEnd::Disconnected => write!(f, "TV disconnected"),
            SessionEnd::TransportLost(reason) => write!(f, "connection lost: {reason}"),
            SessionEnd::Cancelled => write!(f, "session closed"),
        }
    }
}

/// Published by the listener task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerState {
    Listening,
    Ended(SessionEnd),
}

/// An authorised, live connection to one TV.
///
/// Exclusively owned by the caller.  Call [`Session::close`] when done;
/// dropping without closing still stops the listener, but cannot wait for it.
pub struct Session {
    dispatcher: CommandDispatcher,
    state_rx: watch::Receiver<ListenerState>,
    cancel_tx: Option<oneshot::Sender<()>>,
    listener: Option<JoinHandle<()>>,
    closed: bool,
}

impl Session {
    /// Performs the authorise handshake over an already-open transport.
    ///
    /// Reads exactly one frame.  On `ms.channel.connect` the listener task is
    /// spawned and the session returned.  On any other outcome the transport
    /// is closed and the error returned; nothing is retried.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// See [`HandshakeError`].
    pub async fn handshake(transport: Transport) -> Result<Self, HandshakeError> {
        let Transport { mut sink, mut source } = transport;

        debug!("awaiting connect event");
        let verdict = match source.receive().await {
            Ok(frame) => authorize(&frame),
            Err(e) => Err(HandshakeError::Transport(e)),
        };

        if let Err(err) = verdict {
            warn!("handshake failed: {err}");
            drop(source);
            if let Err(e) = sink.close().await {
                debug!("closing transport after failed handshake: {e}");
            }
            return Err(err);
        }

        info!("session authorized; starting listener");

        let (state_tx, state_rx) = watch::channel(ListenerState::Listening);
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let listener = tokio::spawn(run_listener(source, cancel_rx, state_tx));

        Ok(Self {
            dispatcher: CommandDispatcher::new(sink, state_rx.clone()),
            state_rx,
            cancel_tx: Some(cancel_tx),
            listener: Some(listener),
            closed: false,
        })
    }

    /// Command names the session accepts, ascending.
    pub fn available_commands(&self) -> Vec<&'static str> {
        self.dispatcher.available_commands()
    }

    /// Sends the key press for `name`.
    ///
    /// # Errors
    ///
    /// [`CommandError::UnknownCommand`] for names outside the catalog,
    /// [`CommandError::SessionEnded`] once the listener has seen a fatal
    /// event or the session was closed, otherwise the transport error.
    pub async fn execute(&mut self, name: &str) -> Result<(), CommandError> {
        self.dispatcher.execute(name).await
    }

    /// Current listener state.
    pub fn state(&self) -> ListenerState {
        self.state_rx.borrow().clone()
    }

    /// `true` while the listener is running.
    pub fn is_alive(&self) -> bool {
        matches!(*self.state_rx.borrow(), ListenerState::Listening)
    }

    /// Waits until the listener has stopped and returns why.
    pub async fn wait_ended(&mut self) -> SessionEnd {
        let result = self
            .state_rx
            .wait_for(|state| matches!(state, ListenerState::Ended(_)))
            .await
            .map(|state| state.clone());

        match result {
            Ok(ListenerState::Ended(end)) => end,
            // The sender only drops without publishing if the task was aborted.
            _ => SessionEnd::Cancelled,
        }
    }

    /// Stops the listener and closes the transport.
    ///
    /// Idempotent: the second and later calls do nothing, and the transport
    /// is closed exactly once.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Some(cancel) = self.cancel_tx.take() {
            // Err means the listener already exited on its own.
            let _ = cancel.send(());
        }
        if let Some(listener) = self.listener.take() {
            if let Err(e) = listener.await {
                error!("listener task failed: {e}");
            }
        }
        if let Err(e) = self.dispatcher.close().await {
            debug!("closing transport: {e}");
        }
        info!("session closed");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel_tx.take() {
            let _ = cancel.send(());
        }
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

/// Classifies the handshake frame.
fn authorize(frame: &[u8]) -> Result<(), HandshakeError> {
    match decode_event(frame) {
        Ok(InboundEvent::Connected { token }) => {
            debug!(token_issued = token.is_some(), "channel connected");
            Ok(())
        }
        Ok(InboundEvent::Unauthorized) => Err(HandshakeError::Unauthorized),
        Ok(InboundEvent::ForcedDisconnect) => Err(HandshakeError::Disconnected),
        Ok(InboundEvent::Unrecognized(tag)) => Err(HandshakeError::UnexpectedEvent(tag)),
        Err(e) => Err(HandshakeError::UnexpectedEvent(e.raw().to_string())),
    }
}

/// Drains inbound frames until cancelled or a fatal condition.
///
/// Informational and malformed frames are logged and skipped; a single bad
/// frame must not kill an otherwise healthy session.
async fn run_listener(
    mut source: Box<dyn FrameSource>,
    mut cancel_rx: oneshot::Receiver<()>,
    state_tx: watch::Sender<ListenerState>,
) {
    let end = loop {
        let received = tokio::select! {
            biased;
            // Resolves on an explicit cancel and also when the sender is
            // dropped along with the session.
            _ = &mut cancel_rx => break SessionEnd::Cancelled,
            received = source.receive() => received,
        };

        let frame = match received {
            Ok(frame) => frame,
            Err(e) => {
                error!("listener: {e}");
                break SessionEnd::TransportLost(e.to_string());
            }
        };

        match decode_event(&frame) {
            Ok(InboundEvent::Connected { .. }) => debug!("listener: repeated connect event"),
            Ok(InboundEvent::Unauthorized) => {
                error!("listener: TV revoked authorization");
                break SessionEnd::Unauthorized;
            }
            Ok(InboundEvent::ForcedDisconnect) => {
                error!("listener: TV disconnected the client");
                break SessionEnd::Disconnected;
            }
            Ok(InboundEvent::Unrecognized(tag)) => debug!("listener: ignoring event {tag}"),
            Err(e) => warn!("listener: {e}"),
        }
    };

    debug!("listener stopped: {end}");
    state_tx.send_replace(ListenerState::Ended(end));
}

// ── Tests ─────────────────────────────────────────────────────────────────────
