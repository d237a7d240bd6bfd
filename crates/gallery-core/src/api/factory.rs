use super::capability::{parse_json, ApiBase, RequestCapability, CONTENT_TYPE, JSON_CONTENT_TYPE};
use super::transport::{HttpMethod, HttpTransport};
use crate::config::GalleryConfig;
use crate::error::{GalleryError, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    error: Option<Value>,
}

/// Builds request capabilities for a configured API root.
///
/// Also performs the one unauthenticated call of the API, the exchange of an
/// access code for a session token.
#[derive(Clone)]
pub struct ApiClientFactory {
    base: ApiBase,
    login_path: String,
}

impl ApiClientFactory {
    pub fn new(config: &GalleryConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        config.validate()?;
        let base = ApiBase::new(
            config.api_root_url()?,
            transport,
            Some(Duration::from_secs(config.request_timeout_secs)),
        );
        Ok(Self {
            base,
            login_path: config.endpoints.login.clone(),
        })
    }

    /// Binds `token` into a new request capability.
    pub fn build(&self, token: impl Into<String>) -> RequestCapability {
        RequestCapability::new(token.into(), self.base.clone())
    }

    pub fn resolve_url(&self, path: &str) -> Result<Url> {
        self.base.resolve(path, &[])
    }

    /// POSTs `{accessCode}` to the login endpoint and returns the issued token.
    ///
    /// An `{error}` body is reported as `GalleryError::AuthRejected`; the
    /// server's message is logged, never returned.
    pub async fn exchange_access_code(&self, access_code: &str) -> Result<String> {
        let path = self.login_path.as_str();
        let url = self.base.resolve(path, &[])?;
        let mut request = self.base.request(HttpMethod::Post, url);
        request.set_header(CONTENT_TYPE, JSON_CONTENT_TYPE);
        request.body = Some(json!({ "accessCode": access_code }));

        let response = self.base.fetch(path, request).await?;

        // A rejected login still carries a JSON body, typically with a 401.
        let parsed = parse_json(path, &response).and_then(|value| {
            serde_json::from_value::<LoginResponse>(value)
                .map_err(|e| GalleryError::decode(path, e.to_string()))
        });

        let body = match parsed {
            Ok(body) => body,
            Err(_) if !response.is_success() => {
                return Err(GalleryError::HttpStatus {
                    path: path.to_string(),
                    status: response.status,
                });
            }
            Err(e) => return Err(e),
        };

        if let Some(error) = body.error.filter(|e| !e.is_null()) {
            tracing::warn!("[Api] Login rejected by server: {}", error);
            return Err(GalleryError::AuthRejected);
        }

        if !response.is_success() {
            return Err(GalleryError::HttpStatus {
                path: path.to_string(),
                status: response.status,
            });
        }

        match body.token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(GalleryError::decode(path, "login response carried no token")),
        }
    }
}
