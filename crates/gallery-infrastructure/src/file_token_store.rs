//! File-backed token store.
//!
//! Persists the session as `{"token": "..."}` in a single JSON file, the
//! desktop equivalent of a browser's local storage key.

use crate::paths::GalleryPaths;
use crate::storage::AtomicJsonFile;
use gallery_core::error::{GalleryError, Result};
use gallery_core::session::{PersistedSession, TokenStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Token store that keeps the persisted session in a JSON file.
///
/// File access runs on the blocking pool so async callers are never stalled
/// by disk I/O.
#[derive(Clone)]
pub struct FileTokenStore {
    file: Arc<AtomicJsonFile<PersistedSession>>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Arc::new(AtomicJsonFile::new(path.into())),
        }
    }

    /// Store at the platform default location (`session.json` in the config dir).
    pub fn new_default() -> Result<Self> {
        let path = GalleryPaths::session_file()
            .map_err(|e| GalleryError::config(format!("Failed to resolve session file: {}", e)))?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[async_trait::async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<PersistedSession> {
        let file = self.file.clone();
        let loaded = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| GalleryError::internal(format!("Failed to join task: {}", e)))??;

        Ok(loaded.unwrap_or_default())
    }

    async fn save(&self, session: &PersistedSession) -> Result<()> {
        let has_token = session.token().is_some();
        let file = self.file.clone();
        let session = session.clone();
        tokio::task::spawn_blocking(move || file.save(&session))
            .await
            .map_err(|e| GalleryError::internal(format!("Failed to join task: {}", e)))??;

        tracing::debug!(
            "[TokenStore] Saved {} session to {:?}",
            if has_token { "authenticated" } else { "empty" },
            self.file.path()
        );
        Ok(())
    }
}
