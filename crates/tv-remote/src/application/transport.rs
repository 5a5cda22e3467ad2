//! Transport capability traits for the TV control channel.
//!
//! The session needs a full-duplex channel of opaque frames.  Rather than one
//! broad "connection" trait, the capability is split in two halves:
//!
//! - [`FrameSink`] – the write side, owned by the foreground command path.
//! - [`FrameSource`] – the read side, owned by the handshake and then by the
//!   listener task.
//!
//! Because each half has exactly one owner, no lock is needed around the
//! connection, and it is impossible for the foreground to read a frame the
//! listener was waiting for.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a transport implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The connection could not be opened.
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    /// TLS client configuration could not be built.
    #[error("TLS setup failed: {0}")]
    Tls(String),

    /// Writing a frame failed.
    #[error("send failed: {0}")]
    Send(String),

    /// Reading a frame failed.
    #[error("receive failed: {0}")]
    Receive(String),

    /// The peer closed the connection (or it was closed locally).
    #[error("connection closed")]
    Closed,
}

/// Write half of a frame transport.
#[async_trait]
pub trait FrameSink: Send {
    /// Sends one frame.
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError>;

    /// Closes the connection.  Called at most once per session.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Read half of a frame transport.
#[async_trait]
pub trait FrameSource: Send {
    /// Waits for the next frame.
    ///
    /// Implementations must be cancel-safe: dropping the returned future
    /// before it completes must not lose a frame that was already read.
    async fn receive(&mut self) -> Result<Vec<u8>, TransportError>;
}

/// An open connection to one device, not yet authorised.
pub struct Transport {
    pub sink: Box<dyn FrameSink>,
    pub source: Box<dyn FrameSource>,
}

impl Transport {
    pub fn new(sink: impl FrameSink + 'static, source: impl FrameSource + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            source: Box::new(source),
        }
    }
}
