//! Minimal HTTP client with safe logging, explicit deadlines, and bearer auth.
//!
//! - Request options: `Auth`, timeout, absolute-URL override
//! - Never logs secret values; authorization headers are always redacted
//! - Every request carries a deadline (client default or per request)
//! - Optional *raw* request/response logging via `CPC_HTTP_RAW=1`
//!
//! Two call shapes are supported: JSON APIs anchored to a base URL
//! ([`HttpClient::post_json`]) and plain page fetches of arbitrary absolute
//! URLs ([`HttpClient::get_text`]) that hand back the status instead of
//! failing on non-2xx.
//!
//! Example (no_run):
//! ```no_run
//! # async fn demo() -> Result<(), cpc_http::HttpError> {
//! let client = cpc_http::HttpClient::new("https://api.example.com/v1/")?;
//! let got: serde_json::Value = client
//!     .post_json("items", Some("token"), &serde_json::json!({"q": 1}))
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and (optionally)
//! raw request/response lines (target `http.raw`) when `CPC_HTTP_RAW=1`.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Method};
pub use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "CPC_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)
const SNIPPET_MAX: usize = 500;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap, body: Option<&[u8]>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    if let Some(bytes) = body {
        if let Ok(s) = std::str::from_utf8(bytes) {
            let mut s = s.to_string();
            if s.len() > RAW_MAX_BODY {
                truncate_at_char_boundary(&mut s, RAW_MAX_BODY);
                s.push('…');
            }
            parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
        } else {
            parts.push(format!("--data-binary @- # ({} bytes)", bytes.len()));
        }
    }
    let (host_path, _) = redact_query(url);
    parts.push(format!("'{}://{}'", url.scheme(), host_path));
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if key.eq_ignore_ascii_case("authorization") {
                val = "Bearer <redacted>".into();
            }
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

// ==============================
// Auth & Request Options
// ==============================

/// Authentication strategies supported by the HTTP client helpers.
///
/// ```
/// use cpc_http::Auth;
///
/// let bearer = Auth::Bearer("token");
/// match bearer {
///     Auth::Bearer(value) => assert_eq!(value, "token"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
    None,
}

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use cpc_http::{Auth, RequestOpts};
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     auth: Some(Auth::Bearer("demo")),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.allow_absolute == false);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

/// Body and status of a fetched page.
#[derive(Debug, Clone)]
pub struct TextResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TextResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

// ==============================
// Client
// ==============================

#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Option<Url>,
    inner: Client,
    pub default_timeout: Duration,
    pub user_agent: Option<String>,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use cpc_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let mut client = Self::unanchored()?;
        client.base = Some(base);
        Ok(client)
    }

    /// Construct a client without a base; every path must be an absolute URL.
    pub fn unanchored() -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base: None,
            inner,
            default_timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        })
    }

    /// Override the default deadline returned by [`HttpClient::new`].
    ///
    /// ```no_run
    /// use cpc_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?
    ///     .with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Send this `User-Agent` on every request.
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    /// POST JSON using optional Bearer auth.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let auth = bearer.map(Auth::Bearer);
        let opts = RequestOpts {
            auth,
            ..Default::default()
        };
        self.post_json_opts(path, body, opts).await
    }

    /// POST JSON with per-request options (headers/auth/timeout).
    pub async fn post_json_opts<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes =
            serde_json::to_vec(body).map_err(|e| HttpError::Build(format!("json body: {e}")))?;
        let exchange = self
            .send(Method::POST, path, Some(bytes), opts)
            .await?;

        if exchange.status.is_success() {
            return serde_json::from_slice::<T>(&exchange.body).map_err(|e| {
                let snippet = snip_body(&exchange.body);
                tracing::warn!(
                    req_id=%exchange.req_id,
                    serde_line=%e.line(),
                    serde_col=%e.column(),
                    serde_err=%e.to_string(),
                    body_snippet=%snippet,
                    "http.response.decode_error"
                );
                HttpError::Decode(e.to_string(), snippet)
            });
        }

        let message = extract_error_message(&exchange.body);
        tracing::warn!(
            req_id=%exchange.req_id,
            status=%exchange.status,
            message=%message,
            x_request_id=%exchange.request_id,
            "http.error"
        );
        Err(HttpError::Api {
            status: exchange.status,
            message,
            request_id: exchange.request_id,
        })
    }

    /// GET a page as text. Non-2xx statuses are returned, not raised.
    pub async fn get_text(&self, url: &str, opts: RequestOpts<'_>) -> Result<TextResponse, HttpError> {
        let opts = RequestOpts {
            allow_absolute: true,
            ..opts
        };
        let exchange = self.send(Method::GET, url, None, opts).await?;
        let text = String::from_utf8_lossy(&exchange.body);
        // A leading byte-order mark is encoding metadata, not page text.
        let body = text.strip_prefix('\u{feff}').unwrap_or(&text).to_string();
        if !exchange.status.is_success() {
            tracing::debug!(
                req_id=%exchange.req_id,
                status=%exchange.status,
                "http.page.non_success"
            );
        }
        Ok(TextResponse {
            status: exchange.status,
            body,
        })
    }

    fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        if allow_absolute || self.base.is_none() {
            if let Ok(abs) = Url::parse(path) {
                return Ok(abs);
            }
        }
        match &self.base {
            Some(base) => base.join(path).map_err(|e| HttpError::Url(e.to_string())),
            None => Err(HttpError::Url(format!("relative path without base: {path}"))),
        }
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        opts: RequestOpts<'_>,
    ) -> Result<Exchange, HttpError> {
        let url = self.resolve(path, opts.allow_absolute)?;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let req_id = format!("r{:x}", REQUEST_SEQ.fetch_add(1, Ordering::Relaxed));

        // ----- Build request -----
        let mut rb = self
            .inner
            .request(method.clone(), url.clone())
            .timeout(timeout);

        if let Some(agent) = &self.user_agent {
            rb = rb.header(USER_AGENT, agent.as_str());
        }

        if let Some(bytes) = &body {
            rb = rb
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(bytes.clone());
        }

        let auth_kind = match &opts.auth {
            Some(Auth::Bearer(tok)) => {
                let tok = sanitize_api_key(tok)?;
                rb = rb.bearer_auth(tok);
                "bearer"
            }
            Some(Auth::None) | None => "none",
        };

        // ----- Safe request logging (pre-send) -----
        let (host_path, redacted_q) = redact_query(&url);
        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%host_path,
            query=?redacted_q,
            timeout_ms=timeout.as_millis() as u64,
            auth_kind,
            has_body=%body.is_some(),
            "http.request.start"
        );

        let request = rb.build().map_err(|e| HttpError::Build(e.to_string()))?;

        if raw_enabled() {
            let curl = make_curl(&method, &url, request.headers(), body.as_deref());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = Instant::now();
        let resp = self
            .inner
            .execute(request)
            .await
            .map_err(|err| network_error(&req_id, "send", timeout, err))?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| network_error(&req_id, "body", timeout, err))?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let request_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%request_id,
            content_len=content_len(&headers, bytes.len()),
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let truncated = bytes.len() > RAW_MAX_BODY;
            let text = String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]);
            tracing::info!(
                target:"http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?hdrs,
                body=%text,
                truncated
            );
        }

        tracing::trace!(
            req_id=%req_id,
            body_snippet=%snip_body(&bytes),
            "http.response.body_snippet"
        );

        Ok(Exchange {
            req_id,
            status,
            request_id,
            body: bytes.to_vec(),
        })
    }
}

struct Exchange {
    req_id: String,
    status: StatusCode,
    request_id: String,
    body: Vec<u8>,
}

// ==============================
// Helpers
// ==============================

fn network_error(req_id: &str, phase: &str, timeout: Duration, err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        tracing::warn!(req_id=%req_id, phase, timeout_ms=timeout.as_millis() as u64, "http.timeout");
        return HttpError::Timeout(timeout);
    }
    let message = err.to_string();
    tracing::warn!(req_id=%req_id, phase, message=%message, "http.network_error");
    HttpError::Network(message)
}

fn extract_error_message(body: &[u8]) -> String {
    // OpenAI style: {"error":{"message":"..."}}
    #[derive(Deserialize)]
    struct OpenAiEnv {
        error: OpenAiDetail,
    }
    #[derive(Deserialize)]
    struct OpenAiDetail {
        message: String,
    }

    // Generic: {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<OpenAiEnv>(body) {
        return env.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        for candidate in [m.message, m.detail, m.error] {
            if !candidate.is_empty() {
                return candidate;
            }
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > SNIPPET_MAX {
        truncate_at_char_boundary(&mut snip, SNIPPET_MAX);
        snip.push_str("...");
    }
    snip
}

fn truncate_at_char_boundary(s: &mut String, max: usize) {
    let mut cut = max.min(s.len());
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    // 1) Trim outer spaces/quotes
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();

    // 2) Remove *all* ASCII whitespace (spaces, tabs, newlines, carriage returns)
    s.retain(|ch| !ch.is_ascii_whitespace());

    if s.is_empty() {
        return Err(HttpError::Build("API key is empty".into()));
    }
    // 3) Ensure ASCII and no control chars
    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }

    // 4) Validate header value upfront for clear errors
    HeaderValue::from_str(&format!("Bearer {}", s))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}

fn is_secret_param(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "access_token"
            | "authorization"
            | "auth"
            | "key"
            | "api_key"
            | "token"
            | "secret"
            | "client_secret"
            | "bearer"
    )
}

fn redact_query(url: &Url) -> (String, Vec<(String, String)>) {
    // Return "host + path" string and redacted query list for logging
    let host_path = format!("{}{}", url.host_str().unwrap_or("-"), url.path());
    let redacted = url
        .query_pairs()
        .map(|(k, v)| {
            let k = k.to_string();
            let v = if is_secret_param(&k) {
                "<redacted>".to_string()
            } else {
                v.to_string()
            };
            (k, v)
        })
        .collect::<Vec<_>>();
    (host_path, redacted)
}

fn content_len(headers: &HeaderMap, body_len: usize) -> usize {
    headers
        .get(reqwest::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(body_len)
}
