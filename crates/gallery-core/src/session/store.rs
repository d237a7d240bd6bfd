//! Token store trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::session::model::PersistedSession;

/// Durable storage for the persisted session.
///
/// A single key holds `{token}`; absence is equivalent to `{}`.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Reads the persisted session, `PersistedSession::logged_out()` when absent.
    async fn load(&self) -> Result<PersistedSession>;

    /// Replaces the persisted session.
    async fn save(&self, session: &PersistedSession) -> Result<()>;

    /// Writes back `{}`.
    async fn clear(&self) -> Result<()> {
        self.save(&PersistedSession::logged_out()).await
    }
}
