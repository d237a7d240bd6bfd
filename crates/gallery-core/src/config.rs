use crate::bucket::BucketId;
use crate::error::{GalleryError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_API_ROOT: &str = "http://localhost:8000/";

fn default_api_root() -> String {
    DEFAULT_API_ROOT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_photos_page_size() -> u32 {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Relative paths of the endpoints the client talks to.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EndpointPaths {
    pub login: String,
    pub profile: String,
    pub outline: String,
    /// Must contain `{id}`, replaced by the bucket id.
    pub bucket_photos: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            login: "login".to_string(),
            profile: "api/profile".to_string(),
            outline: "api/buckets/counts".to_string(),
            bucket_photos: "api/buckets/{id}".to_string(),
        }
    }
}

impl EndpointPaths {
    pub fn bucket_photos_for(&self, id: &BucketId) -> String {
        self.bucket_photos.replace("{id}", &id.to_string())
    }
}

/// Client configuration, read from `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GalleryConfig {
    #[serde(default = "default_api_root")]
    pub api_root: String,
    #[serde(default)]
    pub endpoints: EndpointPaths,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_photos_page_size")]
    pub photos_page_size: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Overrides the platform location of the persisted session file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_file: Option<PathBuf>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            api_root: default_api_root(),
            endpoints: EndpointPaths::default(),
            request_timeout_secs: default_request_timeout_secs(),
            photos_page_size: default_photos_page_size(),
            log_level: default_log_level(),
            session_file: None,
        }
    }
}

impl GalleryConfig {
    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into();
        self
    }

    /// Parses `api_root`, forcing a trailing slash so relative paths are
    /// appended to it rather than replacing its last segment.
    pub fn api_root_url(&self) -> Result<Url> {
        let mut root = self.api_root.trim().to_string();
        if root.is_empty() {
            return Err(GalleryError::config("api_root must not be empty"));
        }
        if !root.ends_with('/') {
            root.push('/');
        }
        let url = Url::parse(&root)?;
        if url.cannot_be_a_base() {
            return Err(GalleryError::config(format!(
                "api_root '{}' cannot be used as a base URL",
                self.api_root
            )));
        }
        Ok(url)
    }

    pub fn validate(&self) -> Result<()> {
        self.api_root_url()?;
        if !self.endpoints.bucket_photos.contains("{id}") {
            return Err(GalleryError::config(
                "endpoints.bucket_photos must contain '{id}'",
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(GalleryError::config("request_timeout_secs must be positive"));
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GalleryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api_root_url().unwrap().as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_api_root_gets_trailing_slash() {
        let config = GalleryConfig::default().with_api_root("https://photos.example.com/v1");
        assert_eq!(
            config.api_root_url().unwrap().as_str(),
            "https://photos.example.com/v1/"
        );
    }

    #[test]
    fn test_invalid_api_root() {
        assert!(GalleryConfig::default().with_api_root("").validate().is_err());
        assert!(GalleryConfig::default().with_api_root("not a url").validate().is_err());
        assert!(GalleryConfig::default().with_api_root("mailto:me@example.com").validate().is_err());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = GalleryConfig::from_toml_str(
            r#"
            api_root = "https://photos.example.com/"
            log_level = "debug"

            [endpoints]
            outline = "api/v2/outline"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_root, "https://photos.example.com/");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.endpoints.outline, "api/v2/outline");
        assert_eq!(config.endpoints.login, "login");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_bucket_photos_path_requires_placeholder() {
        let result = GalleryConfig::from_toml_str(
            r#"
            [endpoints]
            bucket_photos = "api/buckets"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_bucket_photos_for() {
        let id = BucketId::new(2023, 6).unwrap();
        assert_eq!(EndpointPaths::default().bucket_photos_for(&id), "api/buckets/2023-6");
    }
}
