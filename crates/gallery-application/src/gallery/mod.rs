mod state;
mod store;

pub use state::{BucketFetch, CommitOutcome, GalleryState, Generation};
pub use store::{GalleryStore, OutlineOutcome};
