//! tv-remote library crate.
//!
//! Finds a smart TV on the local network and drives it over an authorised
//! WebSocket session with remote-control key presses.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! main.rs (clap, prompts)
//!         ↓
//! [tv-remote]
//!   ├── application/      Use cases: discovery, session handshake + listener,
//!   │                     command dispatch.  Depends on traits only.
//!   └── infrastructure/
//!         ├── network/    SSDP socket, HTTP descriptor fetch, wss:// transport
//!         ├── prompt      Numbered stdin/stdout picker (non-TTY fallback)
//!         ├── storage/    TOML config file
//!         └── terminal    Arrow-key picker (crossterm)
//!         ↓
//! [tv-remote-core]        Command catalog, JSON messages, SSDP text codec
//! ```
//!
//! # Layer rules
//!
//! - `application` depends on `tv-remote-core` and its own traits
//!   (`FrameSink`, `FrameSource`, `SsdpSearch`, `DescriptorFetcher`,
//!   `Selector`).  It never touches a socket.
//! - `infrastructure` implements those traits with `tokio`, `reqwest`,
//!   `tokio-tungstenite` and `crossterm`.
//!
//! This is what lets the session tests drive the handshake and listener with
//! an in-memory scripted transport instead of a real TV.

/// Application layer: discovery, session, and dispatch use cases.
pub mod application;

/// Infrastructure layer: network adapters, prompt UI, config file.
pub mod infrastructure;
