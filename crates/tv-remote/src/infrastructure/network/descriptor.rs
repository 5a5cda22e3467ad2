//! HTTP descriptor fetch.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::application::discover::{DescriptorError, DescriptorFetcher};

/// [`DescriptorFetcher`] backed by a shared `reqwest` client.
///
/// The client ignores proxy environment variables: descriptor URLs always
/// point at a device on the local network.
#[derive(Debug, Clone)]
pub struct HttpDescriptorFetcher {
    client: Client,
}

impl HttpDescriptorFetcher {
    /// Builds a fetcher whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Fails only if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .user_agent(concat!("tv-remote/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DescriptorFetcher for HttpDescriptorFetcher {
    async fn fetch(&self, url: &str) -> Result<String, DescriptorError> {
        let request_error = |e: reqwest::Error| DescriptorError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        };

        debug!("GET {url}");
        let response = self.client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DescriptorError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(request_error)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP response on loopback and returns its base URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await.unwrap();
            let response = format!(
                "{status_line}\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });
        format!("http://{addr}/dmr.xml")
    }

    #[tokio::test]
    async fn test_fetch_returns_body_on_200() {
        // Arrange
        let url = serve_once("HTTP/1.1 200 OK", "<root><device/></root>").await;
        let fetcher = HttpDescriptorFetcher::new(Duration::from_secs(2)).unwrap();

        // Act
        let body = fetcher.fetch(&url).await.unwrap();

        // Assert
        assert_eq!(body, "<root><device/></root>");
    }

    #[tokio::test]
    async fn test_fetch_non_200_is_status_error() {
        let url = serve_once("HTTP/1.1 404 Not Found", "").await;
        let fetcher = HttpDescriptorFetcher::new(Duration::from_secs(2)).unwrap();

        let err = fetcher.fetch(&url).await.unwrap_err();

        assert_eq!(err, DescriptorError::Status { url, status: 404 });
    }

    #[tokio::test]
    async fn test_fetch_other_2xx_is_rejected() {
        let url = serve_once("HTTP/1.1 204 No Content", "").await;
        let fetcher = HttpDescriptorFetcher::new(Duration::from_secs(2)).unwrap();

        let err = fetcher.fetch(&url).await.unwrap_err();

        assert!(matches!(err, DescriptorError::Status { status: 204, .. }));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_request_error() {
        // Arrange: bind then drop so nothing is listening on the port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let fetcher = HttpDescriptorFetcher::new(Duration::from_secs(2)).unwrap();

        // Act
        let err = fetcher.fetch(&format!("http://{addr}/")).await.unwrap_err();

        // Assert
        assert!(matches!(err, DescriptorError::Request { .. }));
    }
}
