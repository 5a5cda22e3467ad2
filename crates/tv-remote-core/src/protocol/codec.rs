//! JSON codec for control-channel frames.
//!
//! Inbound frames are decoded into [`InboundEvent`]s; outbound clicks are
//! encoded from a key code into the exact JSON bytes the TV expects.

use thiserror::Error;

use crate::protocol::messages::{EventEnvelope, InboundEvent, RemoteControlMessage};

/// Longest excerpt of an undecodable frame kept in an error.
const RAW_EXCERPT_CHARS: usize = 256;

/// Errors that can occur during frame encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The frame is not a JSON object with a string `event` field.
    #[error("malformed event frame ({reason}): {raw}")]
    MalformedEvent { reason: String, raw: String },

    /// The outbound command could not be serialised.
    #[error("failed to encode command: {0}")]
    Encode(String),
}

impl ProtocolError {
    /// A short diagnostic string: the raw frame excerpt for malformed events.
    pub fn raw(&self) -> &str {
        match self {
            ProtocolError::MalformedEvent { raw, .. } => raw,
            ProtocolError::Encode(reason) => reason,
        }
    }
}

/// Decodes one inbound frame into an [`InboundEvent`].
///
/// Unknown event tags are not an error; they decode to
/// [`InboundEvent::Unrecognized`].  Only frames that are not valid JSON or
/// lack an `event` string fail.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedEvent`] carrying an excerpt of the frame.
///
/// # Examples
///
/// ```rust
/// use tv_remote_core::{decode_event, InboundEvent};
///
/// let event = decode_event(br#"{"event":"ms.channel.unauthorized"}"#).unwrap();
/// assert_eq!(event, InboundEvent::Unauthorized);
/// ```
pub fn decode_event(frame: &[u8]) -> Result<InboundEvent, ProtocolError> {
    let envelope: EventEnvelope =
        serde_json::from_slice(frame).map_err(|e| ProtocolError::MalformedEvent {
            reason: e.to_string(),
            raw: excerpt(frame),
        })?;
    Ok(InboundEvent::from_envelope(envelope))
}

/// Encodes a `Click` of `key_code` as JSON bytes.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialisation fails.
pub fn encode_click(key_code: &str) -> Result<Vec<u8>, ProtocolError> {
    serde_json::to_vec(&RemoteControlMessage::click(key_code))
        .map_err(|e| ProtocolError::Encode(e.to_string()))
}

fn excerpt(frame: &[u8]) -> String {
    String::from_utf8_lossy(frame)
        .chars()
        .take(RAW_EXCERPT_CHARS)
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
