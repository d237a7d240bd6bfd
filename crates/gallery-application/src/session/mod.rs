mod manager;

pub use manager::{RestoreOutcome, SessionManager};
