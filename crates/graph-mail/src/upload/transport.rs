//! HTTP transport used by the chunked uploader
//!
//! The uploader only needs one thing from HTTP: send a request with a byte
//! body and get back the exact status code and response body. Keeping that
//! behind a trait lets the chunk loop run against a scripted transport in tests.

use anyhow::{Context, Result};
use std::time::Duration;
use ureq::http::{Method, Request};

/// One outgoing request of the upload protocol
#[derive(Debug)]
pub struct TransportRequest<'a> {
    pub method: Method,
    pub url: &'a str,
    pub headers: Vec<(&'static str, String)>,
    pub body: &'a [u8],
}

impl TransportRequest<'_> {
    /// Look up a header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response: status code plus body bytes
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Performs a single HTTP exchange
///
/// Implementations must return non-2xx responses as `Ok` with their status;
/// only connection-level failures are errors.
pub trait UploadTransport: Send + Sync {
    fn send(&self, request: &TransportRequest<'_>) -> Result<TransportResponse>;
}

/// Blocking transport backed by a ureq agent
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Per-request timeout when none is configured
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new() -> Self {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    /// Create a transport whose every request is bounded by `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadTransport for UreqTransport {
    fn send(&self, request: &TransportRequest<'_>) -> Result<TransportResponse> {
        let mut builder = Request::builder()
            .method(request.method.clone())
            .uri(request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }
        let http_request = builder
            .body(request.body)
            .context("Failed to build upload request")?;

        let mut response = self
            .agent
            .run(http_request)
            .with_context(|| format!("Failed to send {} to upload session", request.method))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_vec()
            .context("Failed to read upload response body")?;

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = TransportRequest {
            method: Method::PUT,
            url: "https://upload.example.com/session",
            headers: vec![("Content-Range", "bytes 0-9/10".to_string())],
            body: &[0u8; 10],
        };
        assert_eq!(request.header("content-range"), Some("bytes 0-9/10"));
        assert_eq!(request.header("Content-Length"), None);
    }
}
