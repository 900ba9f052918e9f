use crate::api::error::{ApiError, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::trace;

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "Dehashed-Api-Key";

/// Status and body of a response that actually arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One authenticated POST with a JSON body.
///
/// Implementations return `ApiError::Transport` when no response was
/// received; any response that did arrive, whatever its status, is returned
/// as a `RawResponse` for the client to classify.
pub trait Transport {
    fn post_json(&self, url: &str, api_key: &str, body: &Value) -> Result<RawResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post_json(&self, url: &str, api_key: &str, body: &Value) -> Result<RawResponse> {
        (**self).post_json(url, api_key, body)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn post_json(&self, url: &str, api_key: &str, body: &Value) -> Result<RawResponse> {
        (**self).post_json(url, api_key, body)
    }
}

/// Blocking HTTP transport backed by a pooled `reqwest` client.
///
/// The timeout is fixed when the client is built and bounds the whole call,
/// connect through body read.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dehashed-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &str, api_key: &str, body: &Value) -> Result<RawResponse> {
        trace!(target: "transport", "POST {}", url);

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()?;

        let status = response.status().as_u16();
        let body = response.text()?;

        trace!(target: "transport", "{} -> {} ({} bytes)", url, status, body.len());
        Ok(RawResponse::new(status, body))
    }
}
