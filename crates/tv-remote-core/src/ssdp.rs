//! SSDP (Simple Service Discovery Protocol) message codec.
//!
//! SSDP is the discovery half of UPnP.  It is HTTP-formatted text carried in
//! UDP datagrams:
//!
//! 1. The searcher multicasts an `M-SEARCH` request to `239.255.255.250:1900`
//!    naming the service type it wants (the `ST` header).
//! 2. Every matching device replies *unicast* to the searcher's source port
//!    with an `HTTP/1.1 200 OK` response whose `LOCATION` header points at the
//!    device's XML descriptor.
//!
//! ```text
//! M-SEARCH * HTTP/1.1                 HTTP/1.1 200 OK
//! HOST: 239.255.255.250:1900          CACHE-CONTROL: max-age=1800
//! MAN: "ssdp:discover"        →       LOCATION: http://192.168.0.107:9197/dmr
//! MX: 5                               ST: urn:schemas-upnp-org:device:...
//! ST: urn:schemas-upnp-org:...        USN: uuid:...::urn:schemas-upnp-org:...
//! ```
//!
//! This module only builds and parses the text.  Socket handling lives in the
//! `tv-remote` crate.

use std::net::{Ipv4Addr, SocketAddrV4};

use thiserror::Error;
use tracing::trace;

/// IPv4 SSDP multicast group and port.
pub const SSDP_MULTICAST_ADDR: SocketAddrV4 =
    SocketAddrV4::new(Ipv4Addr::new(239, 255, 255, 250), 1900);

/// Search target matching TVs that expose a UPnP media renderer.
pub const DEFAULT_SEARCH_TARGET: &str = "urn:schemas-upnp-org:device:MediaRenderer:1";

/// Default length of the discovery window in seconds.
pub const DEFAULT_DISCOVERY_TIMEOUT_SECS: u64 = 5;

/// UPnP 1.1 caps `MX` at 5 seconds.
const MAX_MX_SECS: u64 = 5;

/// Error type for SSDP response parsing.
#[derive(Debug, Error, PartialEq)]
pub enum SsdpError {
    /// The datagram is not valid UTF-8 text.
    #[error("datagram is not UTF-8 text")]
    NotText,

    /// The status line is not an `HTTP/1.x 200` response.
    #[error("not a successful search response: {0:?}")]
    NotOk(String),

    /// The response has no `LOCATION` header.
    #[error("search response has no LOCATION header")]
    MissingLocation,
}

/// A parsed `M-SEARCH` response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchResponse {
    /// URL of the device descriptor document.
    pub location: String,
    /// The `ST` header echoed by the device.
    pub search_target: Option<String>,
    /// Unique service name identifying the responding service instance.
    pub usn: Option<String>,
}

/// Builds an `M-SEARCH` request for `search_target`.
///
/// `wait_secs` becomes the `MX` header (how long devices may delay their
/// reply); it is clamped to `1..=5` as UPnP requires.
pub fn build_m_search(search_target: &str, wait_secs: u64) -> String {
    let mx = wait_secs.clamp(1, MAX_MX_SECS);
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {SSDP_MULTICAST_ADDR}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: {mx}\r\n\
         ST: {search_target}\r\n\
         \r\n"
    )
}

/// Parses a unicast search response datagram.
///
/// Header names are matched case-insensitively; unknown headers are ignored.
///
/// # Errors
///
/// - [`SsdpError::NotText`] for non-UTF-8 payloads.
/// - [`SsdpError::NotOk`] if the status line is not `HTTP/1.x 200`.
/// - [`SsdpError::MissingLocation`] if there is no usable `LOCATION`.
pub fn parse_search_response(datagram: &[u8]) -> Result<SearchResponse, SsdpError> {
    let text = std::str::from_utf8(datagram).map_err(|_| SsdpError::NotText)?;
    let mut lines = text.lines();

    let status_line = lines.next().unwrap_or_default().trim();
    let mut parts = status_line.split_whitespace();
    let is_http = parts.next().is_some_and(|v| v.starts_with("HTTP/1."));
    let is_ok = parts.next() == Some("200");
    if !(is_http && is_ok) {
        return Err(SsdpError::NotOk(status_line.to_string()));
    }

    let mut location = None;
    let mut search_target = None;
    let mut usn = None;

    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            if !line.trim().is_empty() {
                trace!("ignoring malformed SSDP header line {line:?}");
            }
            continue;
        };
        let value = value.trim();
        match name.trim().to_ascii_lowercase().as_str() {
            "location" if !value.is_empty() => location = Some(value.to_string()),
            "st" => search_target = Some(value.to_string()),
            "usn" => usn = Some(value.to_string()),
            _ => {}
        }
    }

    Ok(SearchResponse {
        location: location.ok_or(SsdpError::MissingLocation)?,
        search_target,
        usn,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = "HTTP/1.1 200 OK\r\n\
        CACHE-CONTROL: max-age=1800\r\n\
        DATE: Mon, 19 Oct 2026 10:00:00 GMT\r\n\
        EXT:\r\n\
        LOCATION: http://192.168.0.107:9197/dmr\r\n\
        SERVER: SHP, UPnP/1.0, Samsung UPnP SDK/1.0\r\n\
        ST: urn:schemas-upnp-org:device:MediaRenderer:1\r\n\
        USN: uuid:0ee8b6a6-0000::urn:schemas-upnp-org:device:MediaRenderer:1\r\n\
        \r\n";

    #[test]
    fn test_build_m_search_contains_required_headers() {
        // Act
        let request = build_m_search(DEFAULT_SEARCH_TARGET, 3);

        // Assert
        assert!(request.starts_with("M-SEARCH * HTTP/1.1\r\n"));
        assert!(request.contains("HOST: 239.255.255.250:1900\r\n"));
        assert!(request.contains("MAN: \"ssdp:discover\"\r\n"));
        assert!(request.contains("MX: 3\r\n"));
        assert!(request.contains("ST: urn:schemas-upnp-org:device:MediaRenderer:1\r\n"));
        assert!(request.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_build_m_search_clamps_mx() {
        assert!(build_m_search("ssdp:all", 0).contains("MX: 1\r\n"));
        assert!(build_m_search("ssdp:all", 30).contains("MX: 5\r\n"));
    }

    #[test]
    fn test_parse_sample_response() {
        // Act
        let response = parse_search_response(SAMPLE_RESPONSE.as_bytes()).unwrap();

        // Assert
        assert_eq!(response.location, "http://192.168.0.107:9197/dmr");
        assert_eq!(
            response.search_target.as_deref(),
            Some("urn:schemas-upnp-org:device:MediaRenderer:1")
        );
        assert!(response.usn.unwrap().starts_with("uuid:0ee8b6a6"));
    }

    #[test]
    fn test_parse_header_names_are_case_insensitive() {
        let datagram = "HTTP/1.1 200 OK\r\nLocation: http://10.0.0.2/desc.xml\r\n\r\n";
        let response = parse_search_response(datagram.as_bytes()).unwrap();
        assert_eq!(response.location, "http://10.0.0.2/desc.xml");
        assert_eq!(response.usn, None);
    }

    #[test]
    fn test_parse_rejects_notify_and_search_requests() {
        let notify = "NOTIFY * HTTP/1.1\r\nLOCATION: http://x/\r\n\r\n";
        assert!(matches!(
            parse_search_response(notify.as_bytes()),
            Err(SsdpError::NotOk(_))
        ));

        let search = build_m_search(DEFAULT_SEARCH_TARGET, 1);
        assert!(matches!(
            parse_search_response(search.as_bytes()),
            Err(SsdpError::NotOk(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_200_status() {
        let datagram = "HTTP/1.1 404 Not Found\r\nLOCATION: http://x/\r\n\r\n";
        assert_eq!(
            parse_search_response(datagram.as_bytes()),
            Err(SsdpError::NotOk("HTTP/1.1 404 Not Found".to_string()))
        );
    }

    #[test]
    fn test_parse_requires_location() {
        let datagram = "HTTP/1.1 200 OK\r\nST: ssdp:all\r\n\r\n";
        assert_eq!(
            parse_search_response(datagram.as_bytes()),
            Err(SsdpError::MissingLocation)
        );
    }

    #[test]
    fn test_parse_rejects_binary_payload() {
        assert_eq!(
            parse_search_response(&[0xff, 0xfe, 0x00]),
            Err(SsdpError::NotText)
        );
    }
}
