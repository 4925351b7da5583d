//! JSON request helper with a time-bounded response cache.
//!
//! ### Behaviour
//! - URL: `<base_url>/<endpoint>`; absolute endpoints are used as-is
//! - Headers: client defaults, overridden by call-site headers;
//!   `content-type: application/json` is added when a body is sent
//! - Cache: keyed by `"<METHOD> <url>"`, entries live for one hour by
//!   default and are refetched once stale
//! - Payload: the `data` field of the JSON response body
//! - Errors: non-2xx and network failures are logged and returned
//!
//! Every [`Response`] can [`reload`](Response::reload) itself, bypassing the
//! cache.

pub mod error;
pub mod transport;

pub use error::RequestError;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use splice_core::KvStore;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Default lifetime of cached responses.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Request client configuration.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Name used in log output.
    pub name: String,
    /// Base URL endpoints are appended to.
    pub base_url: String,
    /// Headers sent with every request.
    pub headers: BTreeMap<String, String>,
}

impl RequestConfig {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self { name: name.into(), base_url: base_url.into(), headers: BTreeMap::new() }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Per-call options.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: BTreeMap<String, String>,
    /// Serve from and populate the response cache (default: true).
    pub use_cache: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self { method: Method::GET, body: None, headers: BTreeMap::new(), use_cache: true }
    }
}

impl RequestOptions {
    pub fn method(method: Method) -> Self {
        Self { method, ..Self::default() }
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn no_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }
}

/// Cached payload with the time it was stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    payload: Value,
    timestamp: DateTime<Utc>,
}

/// Result of a request, fresh or cached.
pub struct Response {
    pub method: Method,
    pub url: Url,
    pub options: RequestOptions,
    /// The `data` field of the response body (`null` when absent).
    pub data: Value,
    /// HTTP status, or `None` when served from cache.
    pub status: Option<StatusCode>,
    pub from_cache: bool,
    endpoint: String,
    client: RequestClient,
}

impl Response {
    /// Re-issue the same request, bypassing the cache.
    pub async fn reload(&self) -> Result<Response, RequestError> {
        let options = RequestOptions { use_cache: false, ..self.options.clone() };
        self.client.request(&self.endpoint, options).await
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("data", &self.data)
            .field("status", &self.status)
            .field("from_cache", &self.from_cache)
            .finish()
    }
}

/// JSON API client with a TTL response cache.
#[derive(Clone)]
pub struct RequestClient {
    name: String,
    base_url: String,
    headers: BTreeMap<String, String>,
    store: Arc<dyn KvStore>,
    transport: Arc<dyn Transport>,
    ttl: Duration,
}

impl fmt::Debug for RequestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestClient")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl RequestClient {
    /// Create a client. The base URL must be an absolute URL.
    pub fn new(
        config: RequestConfig, store: Arc<dyn KvStore>, transport: Arc<dyn Transport>,
    ) -> Result<Self, RequestError> {
        Url::parse(&config.base_url).map_err(|e| RequestError::InvalidUrl(format!("{}: {e}", config.base_url)))?;

        Ok(Self {
            name: config.name,
            base_url: config.base_url,
            headers: config.headers,
            store,
            transport,
            ttl: DEFAULT_CACHE_TTL,
        })
    }

    /// Override the cache lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn get(&self, endpoint: &str) -> Result<Response, RequestError> {
        self.request(endpoint, RequestOptions::method(Method::GET)).await
    }

    pub async fn post(&self, endpoint: &str, body: Value) -> Result<Response, RequestError> {
        self.request(endpoint, RequestOptions::method(Method::POST).body(body))
            .await
    }

    pub async fn put(&self, endpoint: &str, body: Value) -> Result<Response, RequestError> {
        self.request(endpoint, RequestOptions::method(Method::PUT).body(body))
            .await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Response, RequestError> {
        self.request(endpoint, RequestOptions::method(Method::DELETE)).await
    }

    /// Issue a request, serving a fresh cached payload when allowed.
    ///
    /// Failures are logged here and returned to the caller.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Response, RequestError> {
        let method = options.method.clone();
        match self.perform(endpoint, options).await {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::error!(client = %self.name, %method, endpoint, error = %e, "request failed");
                Err(e)
            }
        }
    }

    /// Drop the cached GET response for `endpoint`.
    pub async fn invalidate(&self, endpoint: &str) -> Result<bool, RequestError> {
        let url = self.build_url(endpoint)?;
        Ok(self.store.remove(&cache_key(&Method::GET, &url)).await?)
    }

    async fn perform(&self, endpoint: &str, options: RequestOptions) -> Result<Response, RequestError> {
        let url = self.build_url(endpoint)?;
        let key = cache_key(&options.method, &url);

        if options.use_cache
            && let Some(entry) = self.fresh_entry(&key).await?
        {
            tracing::debug!(client = %self.name, url = %url, "response cache hit");
            return Ok(self.respond(endpoint, url, options, entry.payload, None, true));
        }

        let headers = self.merge_headers(&options)?;
        let body = options.body.as_ref().map(Value::to_string);
        let request = HttpRequest { method: options.method.clone(), url: url.clone(), headers, body };

        let response = self.transport.send(request).await?;
        if !response.status.is_success() {
            return Err(RequestError::HttpStatus { status: response.status.as_u16() });
        }

        let payload = parse_payload(&response.body)?;
        tracing::debug!(client = %self.name, url = %url, status = response.status.as_u16(), "request completed");

        if options.use_cache {
            let entry = CacheEntry { payload: payload.clone(), timestamp: Utc::now() };
            let serialized = serde_json::to_string(&entry).map_err(|e| RequestError::Parse(e.to_string()))?;
            self.store.set(&key, &serialized).await?;
        }

        Ok(self.respond(endpoint, url, options, payload, Some(response.status), false))
    }

    fn respond(
        &self, endpoint: &str, url: Url, options: RequestOptions, data: Value, status: Option<StatusCode>,
        from_cache: bool,
    ) -> Response {
        Response {
            method: options.method.clone(),
            url,
            options,
            data,
            status,
            from_cache,
            endpoint: endpoint.to_string(),
            client: self.clone(),
        }
    }

    /// Read the cache entry under `key` if it is younger than the TTL.
    async fn fresh_entry(&self, key: &str) -> Result<Option<CacheEntry>, RequestError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(key, error = %e, "ignoring unreadable cache entry");
                return Ok(None);
            }
        };

        let ttl = TimeDelta::from_std(self.ttl).unwrap_or(TimeDelta::MAX);
        if Utc::now().signed_duration_since(entry.timestamp) < ttl {
            Ok(Some(entry))
        } else {
            tracing::debug!(key, "response cache entry is stale");
            Ok(None)
        }
    }

    fn build_url(&self, endpoint: &str) -> Result<Url, RequestError> {
        let full = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else if endpoint.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint.trim_start_matches('/'))
        };

        Url::parse(&full).map_err(|e| RequestError::InvalidUrl(format!("{full}: {e}")))
    }

    fn merge_headers(&self, options: &RequestOptions) -> Result<HeaderMap, RequestError> {
        let mut headers = HeaderMap::new();
        for (name, value) in self.headers.iter().chain(options.headers.iter()) {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RequestError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| RequestError::InvalidHeader(format!("{name}: {e}")))?;
            headers.insert(name, value);
        }

        if options.body.is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        Ok(headers)
    }
}

fn cache_key(method: &Method, url: &Url) -> String {
    format!("{method} {url}")
}

/// Extract the `data` field from a JSON response body.
fn parse_payload(body: &[u8]) -> Result<Value, RequestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    let json: Value = serde_json::from_slice(body).map_err(|e| RequestError::Parse(e.to_string()))?;
    Ok(json.get("data").cloned().unwrap_or(Value::Null))
}
