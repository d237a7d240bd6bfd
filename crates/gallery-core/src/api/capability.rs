//! Token-bound request capability.

use super::transport::{ApiRequest, ApiResponse, HttpMethod, HttpTransport};
use crate::error::{GalleryError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Caller-supplied request options.
///
/// `Authorization` and `Content-Type` given here are always overwritten by the
/// capability's own values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

/// API root plus the transport used to reach it.
#[derive(Clone)]
pub(crate) struct ApiBase {
    root: Url,
    transport: Arc<dyn HttpTransport>,
    timeout: Option<Duration>,
}

impl ApiBase {
    pub(crate) fn new(root: Url, transport: Arc<dyn HttpTransport>, timeout: Option<Duration>) -> Self {
        Self {
            root,
            transport,
            timeout,
        }
    }

    pub(crate) fn resolve(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let mut url = self.root.join(path.trim_start_matches('/'))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }

    pub(crate) fn request(&self, method: HttpMethod, url: Url) -> ApiRequest {
        let mut request = ApiRequest::new(method, url);
        request.timeout = self.timeout;
        request
    }

    /// Sends the request and logs the elapsed wall-clock time.
    pub(crate) async fn fetch(&self, path: &str, request: ApiRequest) -> Result<ApiResponse> {
        let start = Instant::now();
        let method = request.method;
        let response = self.transport.send(request).await;
        let elapsed = start.elapsed().as_secs_f64();

        match &response {
            Ok(res) => tracing::debug!(
                "[Api] {} {} -> {} in {:.3}s",
                method,
                path,
                res.status,
                elapsed
            ),
            Err(e) => tracing::debug!("[Api] {} {} failed after {:.3}s: {}", method, path, elapsed, e),
        }

        response
    }
}

pub(crate) fn parse_json(path: &str, response: &ApiResponse) -> Result<Value> {
    serde_json::from_str(&response.body).map_err(|e| GalleryError::decode(path, e.to_string()))
}

/// A request function bound to one session token.
///
/// Cloning is cheap; all clones share the same transport.
#[derive(Clone)]
pub struct RequestCapability {
    token: String,
    base: ApiBase,
}

impl RequestCapability {
    pub(crate) fn new(token: String, base: ApiBase) -> Self {
        Self { token, base }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Resolves `path` against the API root.
    pub fn resolve_url(&self, path: &str) -> Result<Url> {
        self.base.resolve(path, &[])
    }

    /// Issues an authorized request and parses the body as JSON.
    ///
    /// Transport failures, non-2xx statuses and non-JSON bodies are returned
    /// as errors; nothing is retried.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Value> {
        let url = self.base.resolve(path, &options.query)?;
        let mut request = self.base.request(options.method, url);
        request.headers = options.headers;
        request.set_header(AUTHORIZATION, self.token.clone());
        request.set_header(CONTENT_TYPE, JSON_CONTENT_TYPE);
        request.body = options.body;

        let response = self.base.fetch(path, request).await?;
        if !response.is_success() {
            return Err(GalleryError::HttpStatus {
                path: path.to_string(),
                status: response.status,
            });
        }

        let payload = parse_json(path, &response)?;
        tracing::trace!("[Api] {} payload: {}", path, payload);
        Ok(payload)
    }

    /// GETs `path` and deserializes the JSON body into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let payload = self.request(path, RequestOptions::get()).await?;
        serde_json::from_value(payload).map_err(|e| GalleryError::decode(path, e.to_string()))
    }
}

impl fmt::Debug for RequestCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestCapability")
            .field("token", &"<redacted>")
            .field("root", &self.base.root.as_str())
            .finish()
    }
}
