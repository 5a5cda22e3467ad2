//! Infrastructure layer.
//!
//! Contains OS-facing adapters: the SSDP UDP socket, the HTTP descriptor
//! client, the WebSocket transport, the terminal pickers, and config-file
//! storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `tv_remote_core`, but MUST NOT be imported by the `application` layer.

pub mod network;
pub mod prompt;
pub mod storage;
pub mod terminal;
