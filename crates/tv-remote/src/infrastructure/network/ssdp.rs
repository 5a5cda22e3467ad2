//! UDP multicast search.
//!
//! # How an SSDP search works (for beginners)
//!
//! SSDP (Simple Service Discovery Protocol) is how UPnP devices find each
//! other without any configuration:
//!
//! 1. We bind an ephemeral UDP port and send a single `M-SEARCH` request to
//!    the well-known multicast group `239.255.255.250:1900`.  Every UPnP
//!    device on the LAN that has joined the group receives it.
//!
//! 2. Each device whose type matches the `ST` (search target) header waits a
//!    random delay of up to `MX` seconds (so replies do not all collide) and
//!    then sends a unicast HTTP-formatted reply straight back to our port.
//!
//! 3. We collect replies until the discovery window closes.  Each reply
//!    carries a `LOCATION` header pointing at the device's XML descriptor.
//!
//! Replies are plain UDP, so nothing stops a device from answering twice.
//! Byte-identical `(LOCATION, USN)` pairs are collapsed here.

use std::collections::HashSet;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, trace, warn};

use tv_remote_core::ssdp::{
    build_m_search, parse_search_response, SearchResponse, SSDP_MULTICAST_ADDR,
};

use crate::application::discover::{DiscoveryError, SsdpSearch};

/// Largest possible UDP payload, so no reply is ever truncated.
const RECV_BUFFER_SIZE: usize = 65_536;

/// `WSAEMSGSIZE`: Windows reports a datagram larger than the buffer as an
/// error instead of truncating it.
const WSAEMSGSIZE: i32 = 10040;

/// Hop limit for the multicast request; replies only come from the LAN.
const MULTICAST_TTL: u32 = 2;

/// [`SsdpSearch`] over a real UDP socket.
#[derive(Debug, Clone)]
pub struct UdpSsdpSearch {
    target: SocketAddr,
    bind_addr: SocketAddr,
}

impl Default for UdpSsdpSearch {
    fn default() -> Self {
        Self {
            target: SocketAddr::V4(SSDP_MULTICAST_ADDR),
            bind_addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)),
        }
    }
}

impl UdpSsdpSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends the search to `target` instead of the multicast group, binding
    /// on `bind_addr`.  Used to search a single host, or a loopback
    /// responder in tests.
    pub fn with_target(target: SocketAddr, bind_addr: SocketAddr) -> Self {
        Self { target, bind_addr }
    }
}

#[async_trait]
impl SsdpSearch for UdpSsdpSearch {
    async fn search(
        &self,
        search_target: &str,
        window: Duration,
    ) -> Result<Vec<SearchResponse>, DiscoveryError> {
        let socket = UdpSocket::bind(self.bind_addr)
            .await
            .map_err(DiscoveryError::Bind)?;
        if self.target.ip().is_multicast() {
            if let Err(e) = socket.set_multicast_ttl_v4(MULTICAST_TTL) {
                debug!("could not set multicast TTL: {e}");
            }
        }

        let request = build_m_search(search_target, window.as_secs());
        socket
            .send_to(request.as_bytes(), self.target)
            .await
            .map_err(|source| DiscoveryError::Send {
                target: self.target,
                source,
            })?;
        info!("M-SEARCH sent to {} (ST: {search_target})", self.target);

        collect_responses(&socket, Instant::now() + window).await
    }
}

/// Reads replies until `deadline`.
async fn collect_responses(
    socket: &UdpSocket,
    deadline: Instant,
) -> Result<Vec<SearchResponse>, DiscoveryError> {
    let mut buf = vec![0u8; RECV_BUFFER_SIZE];
    let mut seen = HashSet::new();
    let mut responses = Vec::new();

    loop {
        let (len, src) = match timeout_at(deadline, socket.recv_from(&mut buf)).await {
            Err(_elapsed) => break,
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) if is_transient_recv_error(&e) => {
                trace!("transient recv error: {e}");
                continue;
            }
            Ok(Err(e)) => return Err(DiscoveryError::Recv(e)),
        };

        match parse_search_response(&buf[..len]) {
            Ok(response) => {
                let key = (response.location.clone(), response.usn.clone());
                if seen.insert(key) {
                    debug!("search response from {src}: {}", response.location);
                    responses.push(response);
                } else {
                    trace!("duplicate search response from {src}");
                }
            }
            Err(e) => warn!("ignoring datagram from {src}: {e}"),
        }
    }

    Ok(responses)
}

/// Returns `true` for receive errors that do not mean the socket is dead.
///
/// Windows reports an ICMP port-unreachable from an earlier send as
/// `ConnectionReset` on the next receive.
fn is_transient_recv_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
            | io::ErrorKind::Interrupted
            | io::ErrorKind::ConnectionReset
    ) || (cfg!(windows) && e.raw_os_error() == Some(WSAEMSGSIZE))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(location: &str, usn: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\n\
             CACHE-CONTROL: max-age=1800\r\n\
             LOCATION: {location}\r\n\
             ST: urn:schemas-upnp-org:device:MediaRenderer:1\r\n\
             USN: {usn}\r\n\
             \r\n"
        )
    }

    /// Binds a loopback "device" that answers the first M-SEARCH with
    /// `replies` and returns its address plus the request it saw.
    async fn spawn_responder(
        replies: Vec<Vec<u8>>,
    ) -> (SocketAddr, tokio::task::JoinHandle<String>) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut buf = [0u8; 2048];
            let (len, src) = socket.recv_from(&mut buf).await.unwrap();
            for reply in replies {
                socket.send_to(&reply, src).await.unwrap();
            }
            String::from_utf8_lossy(&buf[..len]).into_owned()
        });
        (addr, handle)
    }

    fn loopback_search(target: SocketAddr) -> UdpSsdpSearch {
        UdpSsdpSearch::with_target(target, "127.0.0.1:0".parse().unwrap())
    }

    #[tokio::test]
    async fn test_search_sends_m_search_and_collects_reply() {
        // Arrange
        let (addr, responder) =
            spawn_responder(vec![reply("http://127.0.0.1:9197/dmr", "uuid:a").into_bytes()])
                .await;

        // Act
        let responses = loopback_search(addr)
            .search("urn:schemas-upnp-org:device:MediaRenderer:1", Duration::from_millis(300))
            .await
            .unwrap();

        // Assert
        let request = responder.await.unwrap();
        assert!(request.starts_with("M-SEARCH * HTTP/1.1\r\n"));
        assert!(request.contains("ST: urn:schemas-upnp-org:device:MediaRenderer:1\r\n"));
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].location, "http://127.0.0.1:9197/dmr");
    }

    #[tokio::test]
    async fn test_search_collapses_identical_replies_keeps_distinct() {
        let (addr, _responder) = spawn_responder(vec![
            reply("http://127.0.0.1:9197/dmr", "uuid:a").into_bytes(),
            reply("http://127.0.0.1:9197/dmr", "uuid:a").into_bytes(),
            reply("http://127.0.0.1:7676/rcr", "uuid:b").into_bytes(),
        ])
        .await;

        let responses = loopback_search(addr)
            .search("ssdp:all", Duration::from_millis(300))
            .await
            .unwrap();

        let locations: Vec<_> = responses.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(
            locations,
            vec!["http://127.0.0.1:9197/dmr", "http://127.0.0.1:7676/rcr"]
        );
    }

    #[tokio::test]
    async fn test_search_ignores_unparseable_datagrams() {
        let (addr, _responder) = spawn_responder(vec![
            b"NOTIFY * HTTP/1.1\r\n\r\n".to_vec(),
            vec![0xff, 0xfe, 0x00],
            reply("http://127.0.0.1:9197/dmr", "uuid:a").into_bytes(),
        ])
        .await;

        let responses = loopback_search(addr)
            .search("ssdp:all", Duration::from_millis(300))
            .await
            .unwrap();

        assert_eq!(responses.len(), 1);
    }

    #[tokio::test]
    async fn test_search_accepts_reply_larger_than_a_small_buffer() {
        // Arrange: the padding pushes LOCATION past the first 4 KiB
        let padded = format!(
            "HTTP/1.1 200 OK\r\n\
             X-PADDING: {}\r\n\
             LOCATION: http://127.0.0.1:9197/dmr\r\n\
             ST: ssdp:all\r\n\
             USN: uuid:big\r\n\
             \r\n",
            "a".repeat(4096)
        );
        let (addr, _responder) = spawn_responder(vec![
            padded.into_bytes(),
            reply("http://127.0.0.1:7676/rcr", "uuid:b").into_bytes(),
        ])
        .await;

        // Act
        let responses = loopback_search(addr)
            .search("ssdp:all", Duration::from_millis(300))
            .await
            .unwrap();

        // Assert: neither reply is lost
        let usns: Vec<_> = responses.iter().map(|r| r.usn.as_deref()).collect();
        assert_eq!(usns, vec![Some("uuid:big"), Some("uuid:b")]);
    }

    #[tokio::test]
    async fn test_search_with_no_replies_returns_empty_after_window() {
        // Arrange: a socket that never answers
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = silent.local_addr().unwrap();
        let started = Instant::now();

        // Act
        let responses = loopback_search(addr)
            .search("ssdp:all", Duration::from_millis(200))
            .await
            .unwrap();

        // Assert
        assert!(responses.is_empty());
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[test]
    fn test_default_targets_multicast_group() {
        let search = UdpSsdpSearch::new();

        let expected: SocketAddr = "239.255.255.250:1900".parse().unwrap();
        assert_eq!(search.target, expected);
    }

    #[test]
    fn test_is_transient_recv_error_recognises_reset_and_timeout() {
        for kind in [
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::TimedOut,
            io::ErrorKind::WouldBlock,
            io::ErrorKind::Interrupted,
        ] {
            assert!(is_transient_recv_error(&io::Error::new(kind, "x")));
        }
    }

    #[cfg(windows)]
    #[test]
    fn test_oversized_datagram_error_is_transient_on_windows() {
        let e = io::Error::from_raw_os_error(WSAEMSGSIZE);

        assert!(is_transient_recv_error(&e));
    }

    #[test]
    fn test_is_transient_recv_error_returns_false_for_other_errors() {
        let e = io::Error::new(io::ErrorKind::PermissionDenied, "denied");

        assert!(!is_transient_recv_error(&e));
    }
}
