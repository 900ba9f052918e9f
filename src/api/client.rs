use crate::api::error::{ApiError, Result};
use crate::api::request::{ApiResult, Endpoint, LogicalRequest};
use crate::api::transport::{HttpTransport, RawResponse, Transport};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.dehashed.com/v2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const API_KEY_ENV: &str = "DEHASHED_API_KEY";

/// Pick the first non-blank credential from `candidates`, in order.
///
/// Callers pass their sources in precedence order (explicit value first).
/// Fails with `ConfigurationMissing` when none yields a key.
pub fn resolve_api_key<I>(candidates: I) -> Result<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
        .ok_or_else(|| {
            ApiError::configuration_missing(format!(
                "API key must be provided, set in {API_KEY_ENV} environment variable, \
                 or stored as api.api_key in the config file"
            ))
        })
}

/// Credential, base address and timeout for one client. Fixed at
/// construction.
#[derive(Clone)]
pub struct ClientContext {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl ClientContext {
    /// Context with the default base address and timeout. A blank key is a
    /// configuration error.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = resolve_api_key([Some(api_key.into())])?;
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Explicit key if given, otherwise `DEHASHED_API_KEY`.
    pub fn from_env(explicit: Option<String>) -> Result<Self> {
        let api_key = resolve_api_key([explicit, std::env::var(API_KEY_ENV).ok()])?;
        Self::new(api_key)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn url_for(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

impl fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientContext")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Executes one authenticated call per request and classifies the outcome.
///
/// The transport (and its connection pool) lives as long as the client and
/// is released when the client is dropped or closed. Sharing a client across
/// threads is allowed when the transport is `Sync`; request ordering and
/// rate limiting are then the caller's problem.
pub struct ApiClient<T: Transport = HttpTransport> {
    context: ClientContext,
    transport: T,
}

impl ApiClient<HttpTransport> {
    pub fn new(context: ClientContext) -> Result<Self> {
        let transport = HttpTransport::new(context.timeout())?;
        Ok(Self::with_transport(context, transport))
    }

    /// Client for the default service, key taken from `explicit` or the
    /// environment.
    pub fn from_env(explicit: Option<String>) -> Result<Self> {
        Self::new(ClientContext::from_env(explicit)?)
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(context: ClientContext, transport: T) -> Self {
        debug!(target: "api", "opening API session for {}", context.base_url());
        Self { context, transport }
    }

    /// Like [`ApiClient::from_env`], with a caller-supplied transport. The
    /// transport is never used when no key is found.
    pub fn from_env_with_transport(explicit: Option<String>, transport: T) -> Result<Self> {
        Ok(Self::with_transport(ClientContext::from_env(explicit)?, transport))
    }

    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    /// Send `request` and classify the result. Exactly one attempt is made.
    pub fn submit(&self, request: &LogicalRequest) -> Result<ApiResult> {
        let url = self.context.url_for(request.endpoint);
        debug!(
            target: "api",
            "submitting {} with fields {:?}",
            request.endpoint,
            request.payload.keys().collect::<Vec<_>>()
        );

        let response = self
            .transport
            .post_json(&url, self.context.api_key(), &request.body())
            .inspect_err(|e| warn!(target: "api", "{} failed: {}", request.endpoint, e))?;

        classify(response)
    }

    /// Release the client and its connection pool.
    pub fn close(self) {
        drop(self);
    }
}

impl<T: Transport> Drop for ApiClient<T> {
    fn drop(&mut self) {
        debug!(target: "api", "closing API session for {}", self.context.base_url());
    }
}

/// Turn a response that arrived into a result or a classified error.
pub fn classify(response: RawResponse) -> Result<ApiResult> {
    if response.is_success() {
        return serde_json::from_str::<Value>(&response.body)
            .map(ApiResult::new)
            .map_err(|e| {
                ApiError::malformed(
                    format!("expected a JSON body with status {}: {e}", response.status),
                    &response.body,
                )
            });
    }

    let message = error_message(response.status, &response.body);
    Err(ApiError::http_status(response.status, message))
}

/// Best available description of a rejected call: the body's `message`
/// field, then its `error` field, then the status line.
fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|details| {
            ["message", "error"]
                .iter()
                .find_map(|key| details.get(*key).and_then(describe))
        })
        .unwrap_or_else(|| status_line(status))
}

fn describe(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn status_line(status: u16) -> String {
    match reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
    {
        Some(reason) => format!("{status} {reason}"),
        None => format!("HTTP {status}"),
    }
}
