//! Async orchestration of the gallery state.
//!
//! `GalleryStore` ties the session to the state container: it fetches the
//! outline and bucket pages with the current capability and commits the
//! results, discarding any that arrive for a collection that has since been
//! replaced.

use super::state::{CommitOutcome, GalleryState};
use crate::session::{RestoreOutcome, SessionManager};
use futures::future::join_all;
use gallery_core::api::{ApiClientFactory, HttpTransport, RequestOptions};
use gallery_core::bucket::BucketDescriptor;
use gallery_core::config::{EndpointPaths, GalleryConfig};
use gallery_core::error::Result;
use gallery_core::photo::{Photo, PhotoPage};
use gallery_core::session::TokenStore;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{RwLock, RwLockReadGuard};

/// Result of `load_outline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineOutcome {
    /// The outline was committed with this many buckets.
    Committed { buckets: usize },
    /// A newer outline load, a logout or a change of token happened while the
    /// request was in flight; the response was dropped.
    Superseded,
}

pub struct GalleryStore {
    session: SessionManager,
    state: RwLock<GalleryState>,
    endpoints: EndpointPaths,
    page_size: u32,
}

impl GalleryStore {
    pub fn new(
        config: &GalleryConfig,
        transport: Arc<dyn HttpTransport>,
        token_store: Arc<dyn TokenStore>,
    ) -> Result<Self> {
        let api = ApiClientFactory::new(config, transport)?;
        Ok(Self {
            session: SessionManager::new(api, token_store, config.endpoints.profile.clone()),
            state: RwLock::new(GalleryState::new()),
            endpoints: config.endpoints.clone(),
            page_size: config.photos_page_size,
        })
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Read access to the current state for rendering.
    pub async fn state(&self) -> RwLockReadGuard<'_, GalleryState> {
        self.state.read().await
    }

    /// Restores the persisted session and, if it is still valid, loads the outline.
    ///
    /// Only an outline failure after a successful restore is returned as an error.
    pub async fn load_initial_state(&self) -> Result<RestoreOutcome> {
        let outcome = self.session.load_initial_state().await;
        if outcome.is_restored() {
            self.load_outline().await?;
        }
        Ok(outcome)
    }

    /// Logs in with `access_code`. The outline is not loaded.
    pub async fn log_in(&self, access_code: &str) -> Result<()> {
        self.session.log_in(access_code).await
    }

    /// User-initiated logout: forgets the persisted session and drops every bucket.
    ///
    /// The session goes first so no load can start against the old token once
    /// the buckets are cleared.
    pub async fn log_out(&self) -> Result<()> {
        let forgotten = self.session.forget_session().await;
        self.state.write().await.reset();
        forgotten
    }

    /// Fetches the outline and replaces the bucket collection with it.
    ///
    /// The response is dropped as `Superseded` if the collection was replaced
    /// or the session changed while the request was in flight.
    pub async fn load_outline(&self) -> Result<OutlineOutcome> {
        let (capability, generation) = {
            let mut state = self.state.write().await;
            let capability = self.session.require_capability()?;
            (capability, state.start_loading_outline())
        };

        let started = Instant::now();
        let fetched = capability
            .get_json::<Vec<BucketDescriptor>>(&self.endpoints.outline)
            .await;

        let mut state = self.state.write().await;
        if state.generation() != generation || !self.session.is_current(&capability) {
            tracing::debug!("[Gallery] Outline from generation {} superseded", generation);
            if state.generation() == generation {
                state.fail_outline();
            }
            return Ok(OutlineOutcome::Superseded);
        }

        match fetched {
            Ok(descriptors) => {
                state.commit_outline(&descriptors)?;
                tracing::info!(
                    "[Gallery] Loaded outline: {} buckets in {:.3}s",
                    descriptors.len(),
                    started.elapsed().as_secs_f64()
                );
                Ok(OutlineOutcome::Committed {
                    buckets: descriptors.len(),
                })
            }
            Err(e) => {
                tracing::warn!("[Gallery] Failed to load outline: {}", e);
                state.fail_outline();
                Err(e)
            }
        }
    }

    /// Fetches and commits the next page of photos for `bucket_id`.
    pub async fn load_next_bucket_page(&self, bucket_id: &str) -> Result<CommitOutcome> {
        let (capability, fetch) = {
            let mut state = self.state.write().await;
            let capability = self.session.require_capability()?;
            match state.begin_bucket_fetch(bucket_id) {
                Ok(fetch) => (capability, fetch),
                Err(outcome) => return Ok(outcome),
            }
        };

        let path = self.endpoints.bucket_photos_for(&fetch.bucket_id);
        let mut options = RequestOptions::get().with_query("first", self.page_size.to_string());
        if let Some(after) = &fetch.after {
            options = options.with_query("after", after.clone());
        }

        let page = match capability.request(&path, options).await {
            Ok(value) => PhotoPage::from_value(&path, value),
            Err(e) => Err(e),
        };

        let mut state = self.state.write().await;
        match page {
            Ok(page) => Ok(state.commit_bucket_page(&fetch, page)),
            Err(e) => {
                tracing::warn!("[Gallery] Failed to load photos for {}: {}", fetch.bucket_id, e);
                state.abort_bucket_fetch(&fetch);
                Err(e)
            }
        }
    }

    /// Loads the next page of each bucket concurrently, e.g. for the buckets
    /// that scrolled into view. Results are in the order of `bucket_ids`.
    pub async fn load_bucket_pages(&self, bucket_ids: &[&str]) -> Vec<Result<CommitOutcome>> {
        join_all(
            bucket_ids
                .iter()
                .map(|bucket_id| self.load_next_bucket_page(bucket_id)),
        )
        .await
    }

    pub async fn commit_bucket_photos(&self, bucket_id: &str, photos: Vec<Photo>) -> CommitOutcome {
        self.state.write().await.commit_bucket_photos(bucket_id, photos)
    }

    pub async fn set_modal_photo(&self, photo: Option<Photo>) {
        self.state.write().await.set_modal_photo(photo);
    }

    pub async fn set_scrolling(&self) {
        self.state.write().await.set_scrolling();
    }

    pub async fn set_scrolling_settled(&self) {
        self.state.write().await.set_scrolling_settled();
    }
}
