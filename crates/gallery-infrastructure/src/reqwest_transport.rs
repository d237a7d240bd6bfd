//! HTTP transport backed by reqwest.

use async_trait::async_trait;
use gallery_core::api::{ApiRequest, ApiResponse, HttpMethod, HttpTransport};
use gallery_core::error::{GalleryError, Result};
use reqwest::Client;

/// Sends API requests with a shared reqwest `Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let target = request.url.path().to_string();

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        // The body is sent as-is; Content-Type comes from the request headers.
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GalleryError::transport(&target, e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GalleryError::transport(&target, format!("failed to read body: {}", e)))?;

        Ok(ApiResponse { status, body })
    }
}
