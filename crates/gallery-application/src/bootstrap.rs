use std::sync::Arc;

use anyhow::{Result, anyhow};
use gallery_core::session::TokenStore;
use gallery_infrastructure::logging::init_tracing;
use gallery_infrastructure::{ConfigService, FileTokenStore, ReqwestTransport};

use crate::gallery::GalleryStore;

/// Wires the production stack: configuration, tracing, the reqwest
/// transport and the file-backed token store.
pub struct GalleryBootstrap {
    pub store: GalleryStore,
}

impl GalleryBootstrap {
    /// Builds the store from the platform default `config.toml`.
    pub fn new() -> Result<Self> {
        Self::with_config_service(&ConfigService::new())
    }

    /// Builds the store from `config_service`.
    ///
    /// Installs a tracing subscriber at the configured level unless one is
    /// already set. The persisted session is not restored yet; call
    /// `GalleryStore::load_initial_state` for that.
    pub fn with_config_service(config_service: &ConfigService) -> Result<Self> {
        let config = config_service
            .get_config()
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;

        if init_tracing(&config.log_level) {
            tracing::debug!("[Bootstrap] Tracing initialized at {}", config.log_level);
        }

        let token_store: Arc<dyn TokenStore> = match &config.session_file {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => Arc::new(
                FileTokenStore::new_default()
                    .map_err(|e| anyhow!("Failed to resolve session file: {}", e))?,
            ),
        };

        let store = GalleryStore::new(&config, Arc::new(ReqwestTransport::new()), token_store)
            .map_err(|e| anyhow!("Failed to build gallery store: {}", e))?;

        tracing::info!("[Bootstrap] Gallery client ready for {}", config.api_root);
        Ok(Self { store })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_bootstrap_with_missing_session_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let session_path = temp_dir.path().join("session.json");
        std::fs::write(
            &config_path,
            format!(
                "api_root = \"http://127.0.0.1:9/\"\nsession_file = {:?}\n",
                session_path
            ),
        )
        .unwrap();

        let bootstrap = GalleryBootstrap::with_config_service(&ConfigService::with_path(&config_path)).unwrap();

        let outcome = bootstrap.store.load_initial_state().await.unwrap();
        assert!(matches!(outcome, crate::session::RestoreOutcome::NoStoredSession));
        assert!(!bootstrap.store.session().is_authenticated());
    }

    #[test]
    fn test_bootstrap_rejects_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "request_timeout_secs = 0\n").unwrap();

        let result = GalleryBootstrap::with_config_service(&ConfigService::with_path(&config_path));
        assert!(result.is_err());
    }
}
