//! # tv-remote-core
//!
//! Shared library for tv-remote containing the TV control-channel message
//! types, the command catalog, and the SSDP discovery message codec.
//!
//! This crate has zero dependencies on sockets, HTTP clients, or terminals.
//! Everything here is plain data in, plain data out, which keeps it trivially
//! unit-testable.
//!
//! # Architecture overview (for beginners)
//!
//! tv-remote finds a smart TV on the local network and sends it remote-control
//! key presses ("VolumeUp", "Mute", ...) over a WebSocket.  This crate defines
//! the pieces both halves of that job agree on:
//!
//! - **`catalog`** – The fixed table mapping human-readable command names to
//!   the TV's key codes (`"VolumeUp"` → `"KEY_VOLUP"`).
//!
//! - **`protocol`** – The JSON messages exchanged with the TV: inbound channel
//!   events (`ms.channel.connect`, ...) and the outbound `ms.remote.control`
//!   click command.
//!
//! - **`ssdp`** – The text format of the multicast `M-SEARCH` request and the
//!   unicast responses devices send back during discovery.
//!
//! - **`descriptor`** – The subset of the UPnP XML device descriptor we read
//!   (the TV's `friendlyName`).
//!
//! - **`device`** – The [`DeviceInfo`] record produced by discovery.

pub mod catalog;
pub mod descriptor;
pub mod device;
pub mod protocol;
pub mod ssdp;

// Re-export the most-used types at the crate root so callers can write
// `tv_remote_core::InboundEvent` instead of the full module path.
pub use catalog::CommandCatalog;
pub use device::DeviceInfo;
pub use protocol::codec::{decode_event, encode_click, ProtocolError};
pub use protocol::messages::InboundEvent;
