//! Session domain module.
//!
//! - `model`: `Session`, `SessionState` and the persisted `{token}` form
//! - `store`: `TokenStore`, the durable storage seam for the persisted form

mod model;
mod store;

pub use model::{PersistedSession, Session, SessionState};
pub use store::TokenStore;
