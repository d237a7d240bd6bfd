pub mod config_service;
pub mod file_token_store;
pub mod logging;
pub mod memory_token_store;
pub mod paths;
pub mod reqwest_transport;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::file_token_store::FileTokenStore;
pub use crate::memory_token_store::InMemoryTokenStore;
pub use crate::reqwest_transport::ReqwestTransport;
