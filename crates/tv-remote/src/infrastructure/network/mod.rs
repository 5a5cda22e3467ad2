//! Network adapters.
//!
//! # Sub-modules
//!
//! - **`ssdp`** – Sends the multicast `M-SEARCH` and collects the unicast
//!   replies until the discovery window closes.  Implements
//!   [`SsdpSearch`](crate::application::discover::SsdpSearch).
//!
//! - **`descriptor`** – Fetches a device's UPnP XML descriptor over HTTP.
//!   Implements [`DescriptorFetcher`](crate::application::discover::DescriptorFetcher).
//!
//! - **`websocket`** – Opens the `wss://` control channel and splits it into
//!   the [`FrameSink`](crate::application::transport::FrameSink) and
//!   [`FrameSource`](crate::application::transport::FrameSource) halves the
//!   session is built on.  TVs present self-signed certificates, so server
//!   certificate verification is disabled for this connection only.

pub mod descriptor;
pub mod ssdp;
pub mod websocket;
