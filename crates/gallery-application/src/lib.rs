//! Session management and gallery state orchestration.

pub mod bootstrap;
pub mod gallery;
pub mod session;

pub use bootstrap::GalleryBootstrap;
pub use gallery::{CommitOutcome, GalleryState, GalleryStore, Generation, OutlineOutcome};
pub use session::{RestoreOutcome, SessionManager};
