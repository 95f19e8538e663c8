//! HTTP transport seam.
//!
//! The client only needs one capability from the network: POST a JSON body to
//! a node and get the status code and raw body back, bounded by a timeout.
//! [`HttpTransport`] provides that over `reqwest`; tests substitute their own.

use crate::error::RpcError;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use std::time::Duration;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A way of delivering one JSON request to one node.
///
/// Implementations report network failures as [`RpcError::Http`] and expired
/// deadlines as [`RpcError::Timeout`]. Any HTTP status is returned as a
/// response; the caller decides what counts as success.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, body: &[u8]) -> Result<HttpResponse, RpcError>;
}

/// `reqwest`-backed transport with a fixed per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: &[u8]) -> Result<HttpResponse, RpcError> {
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body.to_vec())
            .send()
            .await
            .map_err(|e| http_error(url, e))?;

        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(|e| http_error(url, e))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn http_error(url: &str, source: reqwest::Error) -> RpcError {
    if source.is_timeout() {
        RpcError::Timeout {
            url: url.to_string(),
        }
    } else {
        RpcError::Http {
            url: url.to_string(),
            source,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_timeout() {
        let transport = HttpTransport::new(Duration::from_secs(3));
        assert_eq!(transport.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_success_range() {
        let ok = HttpResponse {
            status: 200,
            body: Vec::new(),
        };
        let no_content = HttpResponse {
            status: 204,
            body: Vec::new(),
        };
        let busy = HttpResponse {
            status: 503,
            body: Vec::new(),
        };
        assert!(ok.is_success());
        assert!(no_content.is_success());
        assert!(!busy.is_success());
    }
}
