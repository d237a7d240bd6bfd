//! Error types for the gallery client.

use thiserror::Error;

/// Message surfaced for every rejected login, regardless of what the server said.
pub const LOGIN_FAILED_MESSAGE: &str = "error logging in";

/// A shared error type for the whole gallery client.
///
/// Transport and parse failures are propagated to the caller untouched; the
/// state layer itself never retries. Soft outcomes (a stale persisted token,
/// a photo page for a bucket that no longer exists) are reported as values by
/// the orchestration layer rather than through this enum.
#[derive(Error, Debug, Clone)]
pub enum GalleryError {
    /// The HTTP request could not be completed (connection, timeout, ...).
    #[error("Transport error for '{path}': {message}")]
    Transport { path: String, message: String },

    /// The server answered with a non-success status code.
    #[error("HTTP {status} for '{path}'")]
    HttpStatus { path: String, status: u16 },

    /// The response body was not JSON, or not the JSON shape we expected.
    #[error("Failed to decode response for '{path}': {message}")]
    Decode { path: String, message: String },

    /// The login endpoint answered with an `{error}` payload.
    #[error("Authentication failed: {}", LOGIN_FAILED_MESSAGE)]
    AuthRejected,

    /// An authenticated operation was attempted while logged out.
    #[error("Not authenticated")]
    Unauthenticated,

    /// A bucket id that does not have the `<year>-<month>` shape.
    #[error("Invalid bucket id '{id}': {reason}")]
    InvalidBucketId { id: String, reason: String },

    /// Persisted session storage failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GalleryError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn transport(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn decode(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_bucket_id(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBucketId {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// True for failures raised while talking to the server
    /// (transport, status or decode).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::HttpStatus { .. } | Self::Decode { .. }
        )
    }

    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, Self::AuthRejected)
    }

    pub fn is_invalid_bucket_id(&self) -> bool {
        matches!(self, Self::InvalidBucketId { .. })
    }

    /// True when the server answered 401/403.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 401 | 403, .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for GalleryError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for GalleryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for GalleryError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for GalleryError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for GalleryError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("invalid URL: {}", err))
    }
}

/// Conversion from anyhow::Error, used at the bootstrap edge.
impl From<anyhow::Error> for GalleryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, GalleryError>`.
pub type Result<T> = std::result::Result<T, GalleryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_rejected_message_is_generic() {
        let err = GalleryError::AuthRejected;
        assert_eq!(err.to_string(), "Authentication failed: error logging in");
        assert!(err.is_auth_rejected());
        assert!(!err.is_transport());
    }

    #[test]
    fn test_transport_family() {
        assert!(GalleryError::transport("profile", "connection refused").is_transport());
        assert!(GalleryError::decode("profile", "expected value").is_transport());
        let status = GalleryError::HttpStatus {
            path: "profile".to_string(),
            status: 401,
        };
        assert!(status.is_transport());
        assert!(status.is_unauthorized());
    }

    #[test]
    fn test_from_serde_json_error() {
        let err: GalleryError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, GalleryError::Serialization { ref format, .. } if format == "JSON"));
    }
}
