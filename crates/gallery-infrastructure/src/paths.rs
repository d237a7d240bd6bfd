//! Unified path management for gallery client files.
//!
//! ```text
//! ~/.config/photo-gallery/     # Config directory (platform dependent)
//! ├── config.toml              # Client configuration
//! └── session.json             # Persisted session token
//! ```

use std::path::PathBuf;

const APP_DIR_NAME: &str = "photo-gallery";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

pub struct GalleryPaths;

impl GalleryPaths {
    /// Returns the gallery configuration directory, e.g. `~/.config/photo-gallery/`.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::ConfigDirNotFound)
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path of the persisted session.
    ///
    /// # Security Note
    ///
    /// The file holds a bearer token and is written with mode 600 on Unix.
    pub fn session_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("session.json"))
    }
}
