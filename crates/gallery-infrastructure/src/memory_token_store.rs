//! In-memory token store.

use gallery_core::error::Result;
use gallery_core::session::{PersistedSession, TokenStore};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Token store that lives only as long as the process.
///
/// Useful for embedding the client where no durable storage is wanted, and in tests.
#[derive(Clone, Default)]
pub struct InMemoryTokenStore {
    session: Arc<Mutex<Option<PersistedSession>>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `session`, as if written by an earlier run.
    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(Some(session))),
        }
    }

    /// Exactly what was last written, `None` if nothing ever was.
    pub async fn snapshot(&self) -> Option<PersistedSession> {
        self.session.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn load(&self) -> Result<PersistedSession> {
        Ok(self.session.lock().await.clone().unwrap_or_default())
    }

    async fn save(&self, session: &PersistedSession) -> Result<()> {
        *self.session.lock().await = Some(session.clone());
        Ok(())
    }
}
