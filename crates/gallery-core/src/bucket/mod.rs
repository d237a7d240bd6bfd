//! Month buckets: the unit of photo grouping.
//!
//! - `id`: validated `"<year>-<month>"` key (`BucketId`)
//! - `model`: outline entries (`BucketDescriptor`) and the incrementally
//!   filled bucket itself (`BucketModel`)

mod id;
mod model;

pub use id::BucketId;
pub use model::{BucketDescriptor, BucketModel};
