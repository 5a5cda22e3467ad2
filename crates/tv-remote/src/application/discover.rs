//! Use case: find TVs on the local network.
//!
//! Discovery is two phases:
//!
//! 1. **Search** – one multicast `M-SEARCH`, then collect every unicast reply
//!    that arrives within the window ([`SsdpSearch`]).
//! 2. **Describe** – for each reply, GET the `LOCATION` URL and read the
//!    device's `friendlyName` from the XML ([`DescriptorFetcher`]).
//!
//! A device whose descriptor cannot be fetched or parsed is skipped with a
//! log line; it does not fail discovery for the others.  Descriptor fetches
//! run concurrently, and the result keeps the order in which the search
//! replies arrived.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use tv_remote_core::descriptor::parse_descriptor;
use tv_remote_core::ssdp::SearchResponse;
use tv_remote_core::DeviceInfo;

/// Errors from the search phase.  Any of these fails discovery as a whole.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The UDP socket could not be bound.
    #[error("failed to bind discovery socket: {0}")]
    Bind(#[source] io::Error),

    /// The `M-SEARCH` datagram could not be sent.
    #[error("failed to send search request to {target}: {source}")]
    Send {
        target: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Receiving failed with a non-transient error.
    #[error("failed to receive search response: {0}")]
    Recv(#[source] io::Error),
}

/// Errors resolving one search reply into a device.  Never fatal to
/// discovery; the reply is skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    /// The HTTP request did not complete.
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The server answered with anything other than 200.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body is not a device descriptor with a `friendlyName`.
    #[error("descriptor at {url} is invalid: {reason}")]
    Parse { url: String, reason: String },

    /// `LOCATION` is not a URL with a host.
    #[error("invalid descriptor location: {0}")]
    InvalidLocation(String),
}

/// Sends one search and collects replies for the window.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SsdpSearch: Send + Sync {
    /// Returns the replies in arrival order; identical replies are collapsed.
    async fn search(
        &self,
        search_target: &str,
        window: Duration,
    ) -> Result<Vec<SearchResponse>, DiscoveryError>;
}

/// Retrieves a descriptor document body.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DescriptorFetcher: Send + Sync {
    /// GETs `url` and returns the body of a 200 response.
    async fn fetch(&self, url: &str) -> Result<String, DescriptorError>;
}

/// Runs a complete discovery.
pub struct DeviceDiscoverer<S, F> {
    searcher: S,
    fetcher: F,
    search_target: String,
    window: Duration,
}

impl<S: SsdpSearch, F: DescriptorFetcher> DeviceDiscoverer<S, F> {
    pub fn new(searcher: S, fetcher: F, search_target: impl Into<String>, window: Duration) -> Self {
        Self {
            searcher,
            fetcher,
            search_target: search_target.into(),
            window,
        }
    }

    /// Searches and resolves every reply.
    ///
    /// Returns an empty list (not an error) when nothing answered.  Two
    /// replies pointing at the same host produce two entries.
    ///
    /// # Errors
    ///
    /// Only search-phase failures are returned; descriptor failures are
    /// logged and the reply dropped.
    pub async fn discover(&self) -> Result<Vec<DeviceInfo>, DiscoveryError> {
        info!(
            "searching for {} ({}s window)",
            self.search_target,
            self.window.as_secs()
        );
        let responses = self
            .searcher
            .search(&self.search_target, self.window)
            .await?;
        debug!("{} search response(s)", responses.len());

        let resolved = join_all(responses.iter().map(|r| self.resolve(r))).await;

        let devices: Vec<DeviceInfo> = resolved
            .into_iter()
            .zip(&responses)
            .filter_map(|(result, response)| match result {
                Ok(device) => Some(device),
                Err(e) => {
                    warn!("skipping {}: {e}", response.location);
                    None
                }
            })
            .collect();

        info!("discovered {} device(s)", devices.len());
        Ok(devices)
    }

    async fn resolve(&self, response: &SearchResponse) -> Result<DeviceInfo, DescriptorError> {
        let location = response.location.as_str();
        let address = host_of(location)?;

        let body = self.fetcher.fetch(location).await?;
        let descriptor = parse_descriptor(&body).map_err(|e| DescriptorError::Parse {
            url: location.to_string(),
            reason: e.to_string(),
        })?;

        let name = descriptor.device.friendly_name.trim();
        if name.is_empty() {
            return Err(DescriptorError::Parse {
                url: location.to_string(),
                reason: "empty friendlyName".to_string(),
            });
        }

        debug!(
            manufacturer = descriptor.device.manufacturer.as_deref().unwrap_or("?"),
            model = descriptor.device.model_name.as_deref().unwrap_or("?"),
            "resolved {name} at {address}"
        );
        Ok(DeviceInfo::new(name, address))
    }
}

/// Extracts the host part of a descriptor URL.
fn host_of(location: &str) -> Result<String, DescriptorError> {
    let url = reqwest::Url::parse(location)
        .map_err(|_| DescriptorError::InvalidLocation(location.to_string()))?;
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .ok_or_else(|| DescriptorError::InvalidLocation(location.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
