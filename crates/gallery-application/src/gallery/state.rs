use gallery_core::bucket::{BucketDescriptor, BucketId, BucketModel};
use gallery_core::error::{GalleryError, Result};
use gallery_core::photo::{Photo, PhotoPage};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Identifies one bucket collection. A photo fetch issued against one
/// generation is discarded if it completes against another.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of committing photos into a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Photos were appended; `loaded` is the bucket's new photo count.
    Appended { bucket_id: String, loaded: usize },
    /// No bucket with that id exists in the current collection.
    UnknownBucket { bucket_id: String },
    /// The fetch was issued against a collection that has since been replaced.
    StaleGeneration { bucket_id: String },
    /// The bucket already holds every page; nothing was requested.
    AlreadyComplete { bucket_id: String },
    /// A page for this bucket is already being fetched.
    AlreadyLoading { bucket_id: String },
}

impl CommitOutcome {
    pub fn is_appended(&self) -> bool {
        matches!(self, CommitOutcome::Appended { .. })
    }
}

/// A page fetch reserved by `begin_bucket_fetch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketFetch {
    pub generation: Generation,
    pub bucket_id: BucketId,
    /// Cursor to send as `after`, `None` for the first page.
    pub after: Option<String>,
}

/// The view-facing gallery state: the ordered bucket collection plus the
/// loading, modal and scrolling flags.
///
/// Every mutation is synchronous and completes before the next one starts;
/// the async orchestration in `GalleryStore` holds a lock around each call.
#[derive(Debug, Default)]
pub struct GalleryState {
    buckets: Vec<BucketModel>,
    index: HashMap<BucketId, usize>,
    in_flight: HashSet<BucketId>,
    generation: Generation,
    is_loading: bool,
    modal_photo: Option<Photo>,
    is_scrolling: bool,
}

impl GalleryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the collection and marks the outline as loading.
    pub fn start_loading_outline(&mut self) -> Generation {
        self.replace_buckets(Vec::new());
        self.is_loading = true;
        self.generation
    }

    /// Replaces the collection with one bucket per descriptor, in order.
    ///
    /// The whole outline is rejected if any descriptor is invalid or
    /// duplicates an earlier month; the collection is then left empty.
    /// `is_loading` is false afterwards either way.
    pub fn commit_outline(&mut self, descriptors: &[BucketDescriptor]) -> Result<Generation> {
        let built = build_buckets(descriptors);
        self.is_loading = false;

        match built {
            Ok(buckets) => {
                tracing::debug!("[Gallery] Committed outline with {} buckets", buckets.len());
                self.replace_buckets(buckets);
                Ok(self.generation)
            }
            Err(e) => {
                tracing::warn!("[Gallery] Rejected outline: {}", e);
                self.replace_buckets(Vec::new());
                Err(e)
            }
        }
    }

    /// The outline request failed: stop loading and keep the collection empty.
    pub fn fail_outline(&mut self) {
        self.is_loading = false;
    }

    /// Appends `photos` to the bucket keyed `bucket_id`.
    ///
    /// An unknown id is a no-op.
    pub fn commit_bucket_photos(&mut self, bucket_id: &str, photos: Vec<Photo>) -> CommitOutcome {
        let Some(bucket) = self.bucket_by_key_mut(bucket_id) else {
            tracing::warn!("[Gallery] Ignoring photos for unknown bucket {}", bucket_id);
            return CommitOutcome::UnknownBucket {
                bucket_id: bucket_id.to_string(),
            };
        };

        let loaded = bucket.append_photos(photos).len();
        CommitOutcome::Appended {
            bucket_id: bucket_id.to_string(),
            loaded,
        }
    }

    /// Reserves the next page fetch for `bucket_id`.
    ///
    /// Returns the outcome to report instead when there is nothing to fetch.
    pub fn begin_bucket_fetch(&mut self, bucket_id: &str) -> std::result::Result<BucketFetch, CommitOutcome> {
        let generation = self.generation;
        let Some(bucket) = self.bucket_by_key(bucket_id) else {
            return Err(CommitOutcome::UnknownBucket {
                bucket_id: bucket_id.to_string(),
            });
        };

        if bucket.is_fully_loaded() {
            return Err(CommitOutcome::AlreadyComplete {
                bucket_id: bucket_id.to_string(),
            });
        }

        let id = bucket.id();
        let after = bucket.next_cursor().map(str::to_string);
        if !self.in_flight.insert(id) {
            return Err(CommitOutcome::AlreadyLoading {
                bucket_id: bucket_id.to_string(),
            });
        }

        Ok(BucketFetch {
            generation,
            bucket_id: id,
            after,
        })
    }

    /// Releases a reservation whose request failed.
    pub fn abort_bucket_fetch(&mut self, fetch: &BucketFetch) {
        if fetch.generation == self.generation {
            self.in_flight.remove(&fetch.bucket_id);
        }
    }

    /// Commits a fetched page, unless the collection changed since `fetch` was issued.
    pub fn commit_bucket_page(&mut self, fetch: &BucketFetch, page: PhotoPage) -> CommitOutcome {
        let bucket_id = fetch.bucket_id.to_string();
        if fetch.generation != self.generation {
            tracing::debug!(
                "[Gallery] Discarding page for {} from generation {} (now {})",
                bucket_id,
                fetch.generation,
                self.generation
            );
            return CommitOutcome::StaleGeneration { bucket_id };
        }

        self.in_flight.remove(&fetch.bucket_id);
        let Some(&position) = self.index.get(&fetch.bucket_id) else {
            return CommitOutcome::UnknownBucket { bucket_id };
        };

        let bucket = &mut self.buckets[position];
        bucket.apply_page(page);
        CommitOutcome::Appended {
            bucket_id,
            loaded: bucket.photos().len(),
        }
    }

    /// Drops every bucket and invalidates in-flight fetches, e.g. on logout.
    pub fn reset(&mut self) {
        self.replace_buckets(Vec::new());
        self.is_loading = false;
        self.modal_photo = None;
        self.is_scrolling = false;
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Buckets in outline order.
    pub fn buckets(&self) -> &[BucketModel] {
        &self.buckets
    }

    pub fn bucket(&self, id: &BucketId) -> Option<&BucketModel> {
        self.index.get(id).map(|&position| &self.buckets[position])
    }

    /// Looks a bucket up by its `"<year>-<month>"` key.
    pub fn bucket_by_key(&self, key: &str) -> Option<&BucketModel> {
        let id = key.parse::<BucketId>().ok()?;
        self.bucket(&id)
    }

    /// Buckets grouped by year, keeping outline order within and across groups.
    pub fn year_groups(&self) -> Vec<(i32, Vec<&BucketModel>)> {
        self.buckets
            .chunk_by(|a, b| a.grouping() == b.grouping())
            .map(|chunk| (chunk[0].grouping(), chunk.iter().collect()))
            .collect()
    }

    pub fn modal_photo(&self) -> Option<&Photo> {
        self.modal_photo.as_ref()
    }

    /// Opens the modal on `photo`, or closes it with `None`.
    pub fn set_modal_photo(&mut self, photo: Option<Photo>) {
        self.modal_photo = photo;
    }

    /// Page scrolling is locked while the modal is open.
    pub fn is_page_scroll_locked(&self) -> bool {
        self.modal_photo.is_some()
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub fn set_scrolling(&mut self) {
        self.is_scrolling = true;
    }

    pub fn set_scrolling_settled(&mut self) {
        self.is_scrolling = false;
    }

    fn bucket_by_key_mut(&mut self, key: &str) -> Option<&mut BucketModel> {
        let id = key.parse::<BucketId>().ok()?;
        let position = *self.index.get(&id)?;
        self.buckets.get_mut(position)
    }

    fn replace_buckets(&mut self, buckets: Vec<BucketModel>) {
        self.index = buckets
            .iter()
            .enumerate()
            .map(|(position, bucket)| (bucket.id(), position))
            .collect();
        self.buckets = buckets;
        self.in_flight.clear();
        self.generation = self.generation.next();
    }
}

fn build_buckets(descriptors: &[BucketDescriptor]) -> Result<Vec<BucketModel>> {
    let mut seen = HashSet::with_capacity(descriptors.len());
    descriptors
        .iter()
        .map(|descriptor| {
            let bucket = BucketModel::from_descriptor(descriptor)?;
            if !seen.insert(bucket.id()) {
                return Err(GalleryError::invalid_bucket_id(
                    bucket.id().to_string(),
                    "duplicate month in outline",
                ));
            }
            Ok(bucket)
        })
        .collect()
}
