//! Configuration service implementation.
//!
//! Loads `GalleryConfig` from `config.toml` (see `GalleryPaths`), then applies
//! environment overrides.

use crate::paths::GalleryPaths;
use gallery_core::config::GalleryConfig;
use gallery_core::error::{GalleryError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Overrides `api_root`.
pub const ENV_API_ROOT: &str = "GALLERY_API_ROOT";
/// Overrides `log_level`.
pub const ENV_LOG_LEVEL: &str = "GALLERY_LOG_LEVEL";

/// Configuration service that loads and caches the client configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    /// Cached configuration, filled on first access.
    config: Arc<RwLock<Option<GalleryConfig>>>,
}

impl ConfigService {
    /// Service reading the platform default `config.toml`.
    pub fn new() -> Self {
        Self {
            path: GalleryPaths::config_file().ok(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading it if not cached.
    pub fn get_config(&self) -> Result<GalleryConfig> {
        {
            let cached = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let loaded = Self::load(self.path.as_deref(), |key| std::env::var(key).ok())?;

        let mut cached = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cached = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cached = None;
    }

    fn load(path: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<GalleryConfig> {
        let mut config = match path {
            Some(path) if path.exists() => {
                tracing::debug!("[Config] Loading {:?}", path);
                let content = std::fs::read_to_string(path)?;
                toml::from_str::<GalleryConfig>(&content).map_err(|e| {
                    GalleryError::config(format!("Failed to parse {:?}: {}", path, e))
                })?
            }
            _ => {
                tracing::debug!("[Config] No config file, using defaults");
                GalleryConfig::default()
            }
        };

        apply_env_overrides(&mut config, env);
        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_env_overrides(config: &mut GalleryConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(api_root) = env(ENV_API_ROOT).filter(|v| !v.trim().is_empty()) {
        config.api_root = api_root;
    }
    if let Some(level) = env(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
        config.log_level = level;
    }
}
