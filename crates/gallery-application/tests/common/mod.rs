use async_trait::async_trait;
use gallery_core::api::{ApiRequest, ApiResponse, HttpTransport};
use gallery_core::error::{GalleryError, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

pub const API_ROOT: &str = "http://photos.test/";

/// Transport answering from scripted responses keyed by URL (query included).
///
/// Several responses queued for one URL are returned in order; the last one
/// repeats.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, VecDeque<ApiResponse>>>,
    delays: Mutex<HashMap<String, Duration>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .entry(format!("{}{}", API_ROOT, path))
            .or_default()
            .push_back(ApiResponse::new(status, body));
    }

    /// Holds responses for `path` back by `delay`.
    pub fn delay(&self, path: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(format!("{}{}", API_ROOT, path), delay);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| request.url.to_string())
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = request.url.to_string();
        self.requests.lock().unwrap().push(request);

        let delay = self.delays.lock().unwrap().get(&url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut responses = self.responses.lock().unwrap();
        let queue = responses
            .get_mut(&url)
            .ok_or_else(|| GalleryError::transport(url.clone(), "connection refused"))?;
        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        response.ok_or_else(|| GalleryError::transport(url, "connection refused"))
    }
}
