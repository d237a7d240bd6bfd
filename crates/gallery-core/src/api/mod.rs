//! Remote API access.
//!
//! - `transport`: the `HttpTransport` seam and raw request/response types
//! - `capability`: `RequestCapability`, a request function bound to a token
//! - `factory`: `ApiClientFactory`, which builds capabilities and performs login

mod capability;
mod factory;
mod transport;

pub use capability::{RequestCapability, RequestOptions, AUTHORIZATION, CONTENT_TYPE, JSON_CONTENT_TYPE};
pub use factory::ApiClientFactory;
pub use transport::{ApiRequest, ApiResponse, HttpMethod, HttpTransport};

/// Test doubles for the transport seam, shared with downstream crates
/// through the `testing` feature.
#[cfg(any(test, feature = "testing"))]
pub mod testing {
    use super::{ApiRequest, ApiResponse, HttpTransport};
    use crate::error::{GalleryError, Result};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers by full URL and records every request it sees.
    /// Unknown URLs fail like an unreachable server.
    pub struct MockTransport {
        responses: Mutex<HashMap<String, ApiResponse>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl Default for MockTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(HashMap::new()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn respond(&self, url: &str, status: u16, body: &str) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), ApiResponse::new(status, body));
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl HttpTransport for MockTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
            let url = request.url.to_string();
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .get(&url)
                .cloned()
                .ok_or_else(|| GalleryError::transport(url, "connection refused"))
        }
    }
}
