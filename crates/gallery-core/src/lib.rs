//! Domain types for the photo gallery client.
//!
//! Photos are grouped into calendar-month buckets that are filled page by
//! page; access to the API is gated by a session token exchanged for an
//! access code.

pub mod api;
pub mod bucket;
pub mod config;
pub mod error;
pub mod photo;
pub mod session;

// Re-export common types
pub use api::{ApiClientFactory, HttpTransport, RequestCapability, RequestOptions};
pub use bucket::{BucketDescriptor, BucketId, BucketModel};
pub use config::GalleryConfig;
pub use error::{GalleryError, Result};
pub use photo::{Photo, PhotoPage};
pub use session::{PersistedSession, Session, SessionState, TokenStore};
