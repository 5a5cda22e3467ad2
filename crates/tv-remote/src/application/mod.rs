//! Application layer use cases.
//!
//! # What use cases are there?
//!
//! - **`discover`** – Multicast search for devices, then fetch and parse each
//!   responder's descriptor into a [`DeviceInfo`](tv_remote_core::DeviceInfo).
//!
//! - **`session`** – The connect/authorise handshake with a TV and the
//!   background listener that drains inbound events for the life of the
//!   session.
//!
//! - **`dispatch`** – Translates command names to key codes and sends the
//!   click messages.
//!
//! - **`select`** – The list-picker capability the CLI uses to choose a
//!   device and then commands.
//!
//! - **`transport`** – The send/receive capability traits the session is
//!   built on.

pub mod discover;
pub mod dispatch;
pub mod select;
pub mod session;
pub mod transport;
