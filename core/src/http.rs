//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and outcomes as plain data. The core
//! builds `HttpRequest` values and consumes `HttpResponse` or `TransportError`
//! values without ever touching the network. The host (firmware HTTP stack,
//! `ureq` in the desktop agent, or a test) executes the exchange whenever it
//! likes and reports back.
//!
//! All fields use owned types so values can cross the FFI boundary without
//! lifetime concerns.

use std::time::Duration;

/// HTTP method for a request. The task API only needs these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `timeout` and `verify_tls` are instructions to the executor; the core has
/// no way to enforce them itself beyond the scheduler's own watchdog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
    pub verify_tls: bool,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A completed HTTP exchange, whatever its status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The exchange never produced a status code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("TLS failure: {0}")]
    Tls(String),

    /// Numeric error reported by a platform HTTP stack.
    #[error("transport error code {0}")]
    Code(i32),
}

/// What the host reports back for an executed request.
pub type HttpOutcome = Result<HttpResponse, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost/tasks".to_string(),
            headers: vec![("Authorization".to_string(), "Bearer k".to_string())],
            body: None,
            timeout: Duration::from_secs(1),
            verify_tls: true,
        };
        assert_eq!(req.header("authorization"), Some("Bearer k"));
        assert_eq!(req.header("content-length"), None);
    }

    #[test]
    fn success_range_is_2xx() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(299, "").is_success());
        assert!(!HttpResponse::new(300, "").is_success());
        assert!(!HttpResponse::new(199, "").is_success());
    }

    #[test]
    fn transport_error_messages() {
        assert_eq!(TransportError::Timeout.to_string(), "request timed out");
        assert_eq!(TransportError::Code(-1).to_string(), "transport error code -1");
    }
}
