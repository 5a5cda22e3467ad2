//! Message types for the TV's JSON control channel.
//!
//! The TV exposes a WebSocket endpoint at
//! `wss://<host>:8002/api/v2/channels/<app-id>`.  Every frame on it is a
//! JSON object.
//!
//! # Message flow
//!
//! ```text
//! TV  → client:  {"event":"ms.channel.connect","data":{"token":"..."}}
//! client → TV:   {"method":"ms.remote.control","params":{"Cmd":"Click",...}}
//! ```
//!
//! Opening the endpoint makes the TV show an approval prompt.  The first
//! frame the TV sends back tells us whether the user accepted
//! (`ms.channel.connect`) or rejected (`ms.channel.unauthorized`) it.

use serde::{Deserialize, Serialize};

// ── Inbound event tags ────────────────────────────────────────────────────────

/// The channel is open and this client is authorised to send commands.
pub const EVENT_CHANNEL_CONNECT: &str = "ms.channel.connect";
/// The user (or the TV's policy) rejected this client.
pub const EVENT_CHANNEL_UNAUTHORIZED: &str = "ms.channel.unauthorized";
/// The TV dropped this client from the channel.
pub const EVENT_CHANNEL_CLIENT_DISCONNECT: &str = "ms.channel.clientDisconnect";

// ── Outbound command constants ────────────────────────────────────────────────

pub const METHOD_REMOTE_CONTROL: &str = "ms.remote.control";
pub const CMD_CLICK: &str = "Click";
pub const OPTION_FALSE: &str = "false";
pub const TYPE_SEND_REMOTE_KEY: &str = "SendRemoteKey";

// ── Endpoint defaults ─────────────────────────────────────────────────────────

/// TLS control port on current TV firmware.
pub const DEFAULT_TV_PORT: u16 = 8002;
/// Application identifier placed in the channel path.
pub const DEFAULT_APP_ID: &str = "samsung.remote.control";

/// Builds the control-channel URL for a device.
///
/// `address` is the bare host from discovery (no port).
///
/// ```rust
/// use tv_remote_core::protocol::control_endpoint;
///
/// let url = control_endpoint("192.168.0.107", 8002, "samsung.remote.control");
/// assert_eq!(url, "wss://192.168.0.107:8002/api/v2/channels/samsung.remote.control");
/// ```
pub fn control_endpoint(address: &str, port: u16, app_id: &str) -> String {
    format!("wss://{address}:{port}/api/v2/channels/{app_id}")
}

// ── Inbound ───────────────────────────────────────────────────────────────────

/// Raw shape of every inbound frame.
///
/// `data` is kept as an untyped JSON value: its shape differs between event
/// kinds, and only the `token` of a connect event is of interest here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl EventEnvelope {
    /// Returns `data.token` when present and a string.
    pub fn token(&self) -> Option<String> {
        self.data
            .as_ref()
            .and_then(|data| data.get("token"))
            .and_then(|token| token.as_str())
            .map(str::to_owned)
    }
}

/// A decoded inbound event.
///
/// Transient: decoded per frame, handled, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// `ms.channel.connect`.  The token is informational only; it is never
    /// stored or reused.
    Connected { token: Option<String> },
    /// `ms.channel.unauthorized`.
    Unauthorized,
    /// `ms.channel.clientDisconnect`.
    ForcedDisconnect,
    /// Any other event tag, kept verbatim for diagnostics.
    Unrecognized(String),
}

impl InboundEvent {
    /// Classifies an envelope by its `event` tag.
    pub fn from_envelope(envelope: EventEnvelope) -> Self {
        match envelope.event.as_str() {
            EVENT_CHANNEL_CONNECT => InboundEvent::Connected {
                token: envelope.token(),
            },
            EVENT_CHANNEL_UNAUTHORIZED => InboundEvent::Unauthorized,
            EVENT_CHANNEL_CLIENT_DISCONNECT => InboundEvent::ForcedDisconnect,
            _ => InboundEvent::Unrecognized(envelope.event),
        }
    }

    /// The wire tag this event was decoded from.
    pub fn tag(&self) -> &str {
        match self {
            InboundEvent::Connected { .. } => EVENT_CHANNEL_CONNECT,
            InboundEvent::Unauthorized => EVENT_CHANNEL_UNAUTHORIZED,
            InboundEvent::ForcedDisconnect => EVENT_CHANNEL_CLIENT_DISCONNECT,
            InboundEvent::Unrecognized(tag) => tag,
        }
    }
}

// ── Outbound ──────────────────────────────────────────────────────────────────

/// A single remote-key click sent to the TV.
///
/// Built fresh for every command and dropped after it is serialised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteControlMessage {
    pub method: String,
    pub params: RemoteControlParams,
}

/// Parameters of [`RemoteControlMessage`].
///
/// The TV expects PascalCase keys, hence the explicit renames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteControlParams {
    #[serde(rename = "Cmd")]
    pub cmd: String,
    #[serde(rename = "DataOfCmd")]
    pub data_of_cmd: String,
    #[serde(rename = "Option")]
    pub option: String,
    #[serde(rename = "TypeOfRemote")]
    pub type_of_remote: String,
}

impl RemoteControlMessage {
    /// Builds a `Click` of the given key code.
    pub fn click(key_code: &str) -> Self {
        Self {
            method: METHOD_REMOTE_CONTROL.to_string(),
            params: RemoteControlParams {
                cmd: CMD_CLICK.to_string(),
                data_of_cmd: key_code.to_string(),
                option: OPTION_FALSE.to_string(),
                type_of_remote: TYPE_SEND_REMOTE_KEY.to_string(),
            },
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
