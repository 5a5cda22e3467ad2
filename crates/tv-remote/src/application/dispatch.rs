//! Command dispatch: name → key code → one click frame on the wire.

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use tv_remote_core::{encode_click, CommandCatalog, ProtocolError};

use crate::application::session::{ListenerState, SessionEnd};
use crate::application::transport::{FrameSink, TransportError};

/// Why a command was not sent.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The name is not in the command catalog.  Nothing was sent.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The session is no longer usable.  Nothing was sent.
    #[error("session ended: {0}")]
    SessionEnded(SessionEnd),

    /// The click frame could not be serialised.
    #[error("failed to encode command: {0}")]
    Protocol(#[from] ProtocolError),

    /// Writing the frame to the TV failed.
    #[error("failed to send command: {0}")]
    Transport(#[from] TransportError),
}

/// Owns the write half of an authorised session.
pub struct CommandDispatcher {
    sink: Box<dyn FrameSink>,
    liveness: watch::Receiver<ListenerState>,
    closed: bool,
}

impl CommandDispatcher {
    pub fn new(sink: Box<dyn FrameSink>, liveness: watch::Receiver<ListenerState>) -> Self {
        Self {
            sink,
            liveness,
            closed: false,
        }
    }

    /// Command names, ascending.
    pub fn available_commands(&self) -> Vec<&'static str> {
        CommandCatalog::available_commands()
    }

    /// Sends one click for `name`.
    ///
    /// The name is validated before liveness so an unknown name is reported
    /// as such even on a dead session.  Exactly one frame is written on
    /// success; none on any error other than a failed send.
    pub async fn execute(&mut self, name: &str) -> Result<(), CommandError> {
        let key_code = CommandCatalog::key_code(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;

        if self.closed {
            return Err(CommandError::SessionEnded(SessionEnd::Cancelled));
        }
        // Clone out so the watch borrow is not held across the send.
        let state = self.liveness.borrow().clone();
        if let ListenerState::Ended(end) = state {
            return Err(CommandError::SessionEnded(end));
        }

        let frame = encode_click(key_code)?;
        debug!(command = name, key_code, "sending click");
        self.sink.send(frame).await?;
        info!("sent {name} ({key_code})");
        Ok(())
    }

    /// Closes the write half.  Only the first call reaches the transport.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.sink.close().await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingSink {
        sent: Arc<Mutex<Vec<Vec<u8>>>>,
        closes: Arc<Mutex<u32>>,
        fail_with: Option<TransportError>,
    }

    #[async_trait]
    impl FrameSink for RecordingSink {
        async fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            self.sent.lock().unwrap().push(frame);
            Ok(())
        }

        async fn close(&mut self) -> Result<(), TransportError> {
            *self.closes.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn dispatcher(
        sink: &RecordingSink,
    ) -> (CommandDispatcher, watch::Sender<ListenerState>) {
        let (tx, rx) = watch::channel(ListenerState::Listening);
        (CommandDispatcher::new(Box::new(sink.clone()), rx), tx)
    }

    fn sent_json(sink: &RecordingSink) -> Vec<serde_json::Value> {
        sink.sent
            .lock()
            .unwrap()
            .iter()
            .map(|f| serde_json::from_slice(f).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_execute_sends_exactly_one_click_with_key_code() {
        // Arrange
        let sink = RecordingSink::default();
        let (mut dispatcher, _tx) = dispatcher(&sink);

        // Act
        tokio_test::assert_ok!(dispatcher.execute("VolumeUp").await);

        // Assert
        let sent = sent_json(&sink);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["method"], "ms.remote.control");
        assert_eq!(sent[0]["params"]["Cmd"], "Click");
        assert_eq!(sent[0]["params"]["DataOfCmd"], "KEY_VOLUP");
        assert_eq!(sent[0]["params"]["Option"], "false");
        assert_eq!(sent[0]["params"]["TypeOfRemote"], "SendRemoteKey");
    }

    #[tokio::test]
    async fn test_execute_power_off_uses_power_off_key() {
        let sink = RecordingSink::default();
        let (mut dispatcher, _tx) = dispatcher(&sink);

        dispatcher.execute("PowerOff").await.unwrap();

        assert_eq!(sent_json(&sink)[0]["params"]["DataOfCmd"], "KEY_POWEROFF");
    }

    #[tokio::test]
    async fn test_unknown_command_sends_nothing() {
        let sink = RecordingSink::default();
        let (mut dispatcher, _tx) = dispatcher(&sink);

        let result = dispatcher.execute("Teleport").await;

        assert!(matches!(result, Err(CommandError::UnknownCommand(ref n)) if n == "Teleport"));
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_command_names_are_case_sensitive() {
        let sink = RecordingSink::default();
        let (mut dispatcher, _tx) = dispatcher(&sink);

        let result = dispatcher.execute("volumeup").await;

        assert!(matches!(result, Err(CommandError::UnknownCommand(_))));
    }

    #[tokio::test]
    async fn test_unknown_command_reported_before_liveness() {
        // Arrange: session already dead
        let sink = RecordingSink::default();
        let (mut dispatcher, tx) = dispatcher(&sink);
        tx.send_replace(ListenerState::Ended(SessionEnd::Disconnected));

        // Act
        let result = dispatcher.execute("Teleport").await;

        // Assert
        assert!(matches!(result, Err(CommandError::UnknownCommand(_))));
    }

    #[tokio::test]
    async fn test_ended_session_refuses_commands() {
        let sink = RecordingSink::default();
        let (mut dispatcher, tx) = dispatcher(&sink);
        tx.send_replace(ListenerState::Ended(SessionEnd::Unauthorized));

        let result = dispatcher.execute("Mute").await;

        assert!(matches!(
            result,
            Err(CommandError::SessionEnded(SessionEnd::Unauthorized))
        ));
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_is_transport_error() {
        let sink = RecordingSink {
            fail_with: Some(TransportError::Closed),
            ..RecordingSink::default()
        };
        let (mut dispatcher, _tx) = dispatcher(&sink);

        let result = dispatcher.execute("Home").await;

        tokio_test::assert_err!(&result);
        assert!(matches!(
            result,
            Err(CommandError::Transport(TransportError::Closed))
        ));
    }

    #[tokio::test]
    async fn test_close_reaches_transport_once() {
        let sink = RecordingSink::default();
        let (mut dispatcher, _tx) = dispatcher(&sink);

        dispatcher.close().await.unwrap();
        dispatcher.close().await.unwrap();

        assert_eq!(*sink.closes.lock().unwrap(), 1);
        assert!(matches!(
            dispatcher.execute("Home").await,
            Err(CommandError::SessionEnded(SessionEnd::Cancelled))
        ));
    }

    #[test]
    fn test_available_commands_match_catalog() {
        let sink = RecordingSink::default();
        let (dispatcher, _tx) = dispatcher(&sink);

        let names = dispatcher.available_commands();

        assert_eq!(names.len(), 22);
        assert_eq!(names.first(), Some(&"ArrowDown"));
        assert_eq!(names.last(), Some(&"VolumeUp"));
    }
}
