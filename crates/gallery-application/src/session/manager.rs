use gallery_core::api::{ApiClientFactory, RequestCapability, RequestOptions};
use gallery_core::error::{GalleryError, Result};
use gallery_core::session::{PersistedSession, Session, TokenStore};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

/// How `load_initial_state` ended.
///
/// None of these interrupt startup; they let the caller decide whether a
/// demotion to logged-out is worth surfacing.
#[derive(Debug, Clone)]
pub enum RestoreOutcome {
    /// Nothing (or `{}`) was persisted. No request was made.
    NoStoredSession,
    /// The persisted token passed the profile probe.
    Restored,
    /// The persisted token failed the probe; storage was cleared.
    StaleToken { reason: GalleryError },
    /// The persisted session could not be read; storage was cleared.
    StorageUnreadable { reason: GalleryError },
}

impl RestoreOutcome {
    pub fn is_restored(&self) -> bool {
        matches!(self, RestoreOutcome::Restored)
    }
}

/// Owns the authentication token, its persisted form and the derived
/// request capability.
///
/// `LoggedOut -> LoggedIn` happens through `load_initial_state` or `log_in`;
/// `log_out` always returns to `LoggedOut`. Orchestrations that touch both
/// storage and the in-memory session are serialized so a startup probe can
/// never erase a token written by a concurrent login. The in-memory session
/// itself is only ever locked for a swap or a clone, never across an await.
pub struct SessionManager {
    session: RwLock<Session>,
    token_store: Arc<dyn TokenStore>,
    api: ApiClientFactory,
    profile_path: String,
    transition: Mutex<()>,
}

impl SessionManager {
    pub fn new(
        api: ApiClientFactory,
        token_store: Arc<dyn TokenStore>,
        profile_path: impl Into<String>,
    ) -> Self {
        Self {
            session: RwLock::new(Session::logged_out()),
            token_store,
            api,
            profile_path: profile_path.into(),
            transition: Mutex::new(()),
        }
    }

    pub fn api(&self) -> &ApiClientFactory {
        &self.api
    }

    /// Restores the persisted session, probing the token against the profile endpoint.
    pub async fn load_initial_state(&self) -> RestoreOutcome {
        let _guard = self.transition.lock().await;

        let persisted = match self.token_store.load().await {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::warn!("[Session] Persisted session unreadable, discarding: {}", e);
                self.clear_storage().await;
                self.log_out();
                return RestoreOutcome::StorageUnreadable { reason: e };
            }
        };

        let Some(token) = persisted.token() else {
            tracing::debug!("[Session] No persisted session");
            self.log_out();
            return RestoreOutcome::NoStoredSession;
        };

        let capability = self.api.build(token);
        match capability
            .request(&self.profile_path, RequestOptions::get())
            .await
        {
            Ok(_) => {
                self.set_session(Session::logged_in(capability));
                tracing::info!("[Session] Restored persisted session");
                RestoreOutcome::Restored
            }
            Err(e) => {
                tracing::warn!("[Session] Persisted token rejected, logging out: {}", e);
                self.clear_storage().await;
                self.log_out();
                RestoreOutcome::StaleToken { reason: e }
            }
        }
    }

    /// Exchanges `access_code` for a token, persists it and logs in.
    ///
    /// Storage is written before the in-memory session changes; if the write
    /// fails the session is left as it was.
    pub async fn log_in(&self, access_code: &str) -> Result<()> {
        let _guard = self.transition.lock().await;

        let token = match self.api.exchange_access_code(access_code).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("[Session] Login failed: {}", e);
                return Err(e);
            }
        };

        self.token_store
            .save(&PersistedSession::with_token(token.clone()))
            .await?;

        self.set_session(Session::logged_in(self.api.build(token)));
        tracing::info!("[Session] Logged in");
        Ok(())
    }

    /// In-memory transition to `LoggedOut`. Persisted storage is untouched.
    pub fn log_out(&self) {
        self.set_session(Session::logged_out());
    }

    /// User-initiated logout: clears persisted storage, then the in-memory session.
    ///
    /// The in-memory session is cleared even when the storage write fails;
    /// that failure is still returned.
    pub async fn forget_session(&self) -> Result<()> {
        let _guard = self.transition.lock().await;

        let cleared = self.token_store.clear().await;
        self.log_out();
        tracing::info!("[Session] Logged out");
        cleared
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_authenticated()
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.session.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn capability(&self) -> Option<RequestCapability> {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .capability()
            .cloned()
    }

    /// The current capability, or `GalleryError::Unauthenticated`.
    pub fn require_capability(&self) -> Result<RequestCapability> {
        self.capability().ok_or(GalleryError::Unauthenticated)
    }

    /// True while `capability` is still the one the session holds.
    pub fn is_current(&self, capability: &RequestCapability) -> bool {
        self.capability()
            .is_some_and(|current| current.token() == capability.token())
    }

    fn set_session(&self, session: Session) {
        *self.session.write().unwrap_or_else(|e| e.into_inner()) = session;
    }

    async fn clear_storage(&self) {
        if let Err(e) = self.token_store.clear().await {
            tracing::warn!("[Session] Failed to clear persisted session: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gallery_core::api::testing::MockTransport;
    use gallery_core::config::GalleryConfig;
    use gallery_infrastructure::InMemoryTokenStore;

    // Token store whose writes always fail
    struct ReadOnlyTokenStore;

    #[async_trait]
    impl TokenStore for ReadOnlyTokenStore {
        async fn load(&self) -> Result<PersistedSession> {
            Ok(PersistedSession::logged_out())
        }

        async fn save(&self, _session: &PersistedSession) -> Result<()> {
            Err(GalleryError::storage("read-only"))
        }
    }

    // Token store whose reads always fail
    struct CorruptTokenStore {
        inner: InMemoryTokenStore,
    }

    #[async_trait]
    impl TokenStore for CorruptTokenStore {
        async fn load(&self) -> Result<PersistedSession> {
            Err(GalleryError::storage("corrupt"))
        }

        async fn save(&self, session: &PersistedSession) -> Result<()> {
            self.inner.save(session).await
        }
    }

    fn manager(transport: Arc<MockTransport>, store: Arc<dyn TokenStore>) -> SessionManager {
        let config = GalleryConfig::default().with_api_root("http://photos.test/");
        let api = ApiClientFactory::new(&config, transport).unwrap();
        SessionManager::new(api, store, config.endpoints.profile.clone())
    }

    #[tokio::test]
    async fn test_restore_without_storage_makes_no_request() {
        let transport = Arc::new(MockTransport::new());
        let store = Arc::new(InMemoryTokenStore::new());
        let manager = manager(transport.clone(), store);

        let outcome = manager.load_initial_state().await;

        assert!(matches!(outcome, RestoreOutcome::NoStoredSession));
        assert!(!manager.is_authenticated());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_restore_with_valid_token() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("http://photos.test/api/profile", 200, r#"{"status":"ok"}"#);
        let store = Arc::new(InMemoryTokenStore::with_session(PersistedSession::with_token("T")));
        let manager = manager(transport.clone(), store.clone());

        let outcome = manager.load_initial_state().await;

        assert!(outcome.is_restored());
        assert!(manager.is_authenticated());
        assert_eq!(manager.session().token(), Some("T"));
        assert_eq!(transport.requests()[0].header("Authorization"), Some("T"));
        assert_eq!(store.snapshot().await, Some(PersistedSession::with_token("T")));
    }

    #[tokio::test]
    async fn test_restore_with_rejected_token_clears_storage() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("http://photos.test/api/profile", 401, "Unauthorized");
        let store = Arc::new(InMemoryTokenStore::with_session(PersistedSession::with_token("T")));
        let manager = manager(transport, store.clone());

        let outcome = manager.load_initial_state().await;

        assert!(matches!(outcome, RestoreOutcome::StaleToken { ref reason } if reason.is_unauthorized()));
        assert!(!manager.is_authenticated());
        assert_eq!(store.snapshot().await, Some(PersistedSession::logged_out()));
    }

    #[tokio::test]
    async fn test_restore_with_unreachable_server_clears_storage() {
        let transport = Arc::new(MockTransport::new());
        let store = Arc::new(InMemoryTokenStore::with_session(PersistedSession::with_token("T")));
        let manager = manager(transport, store.clone());

        let outcome = manager.load_initial_state().await;

        assert!(matches!(outcome, RestoreOutcome::StaleToken { .. }));
        assert_eq!(store.snapshot().await, Some(PersistedSession::logged_out()));
    }

    #[tokio::test]
    async fn test_restore_with_unreadable_storage() {
        let transport = Arc::new(MockTransport::new());
        let inner = InMemoryTokenStore::with_session(PersistedSession::with_token("T"));
        let store = Arc::new(CorruptTokenStore {
            inner: inner.clone(),
        });
        let manager = manager(transport.clone(), store);

        let outcome = manager.load_initial_state().await;

        assert!(matches!(outcome, RestoreOutcome::StorageUnreadable { .. }));
        assert!(transport.requests().is_empty());
        assert_eq!(inner.snapshot().await, Some(PersistedSession::logged_out()));
    }

    #[tokio::test]
    async fn test_log_in_persists_token() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("http://photos.test/login", 200, r#"{"token":"abc"}"#);
        transport.respond("http://photos.test/api/profile", 200, "{}");
        let store = Arc::new(InMemoryTokenStore::new());
        let manager = manager(transport.clone(), store.clone());

        manager.log_in("1234").await.unwrap();

        assert!(manager.is_authenticated());
        assert_eq!(store.snapshot().await, Some(PersistedSession::with_token("abc")));

        manager
            .require_capability()
            .unwrap()
            .request("api/profile", RequestOptions::get())
            .await
            .unwrap();
        let sent = transport.requests();
        assert_eq!(sent.last().unwrap().header("Authorization"), Some("abc"));
    }

    #[tokio::test]
    async fn test_rejected_log_in_leaves_state_untouched() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("http://photos.test/login", 401, r#"{"error":"invalid code"}"#);
        let store = Arc::new(InMemoryTokenStore::new());
        let manager = manager(transport, store.clone());

        let err = manager.log_in("bad").await.unwrap_err();

        assert!(err.is_auth_rejected());
        assert!(!manager.is_authenticated());
        assert!(store.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_log_in_does_not_apply_when_storage_fails() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("http://photos.test/login", 200, r#"{"token":"abc"}"#);
        let manager = manager(transport, Arc::new(ReadOnlyTokenStore));

        let err = manager.log_in("1234").await.unwrap_err();

        assert!(matches!(err, GalleryError::Storage(_)));
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_log_out_keeps_storage_and_forget_clears_it() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("http://photos.test/login", 200, r#"{"token":"abc"}"#);
        let store = Arc::new(InMemoryTokenStore::new());
        let manager = manager(transport, store.clone());
        manager.log_in("1234").await.unwrap();

        manager.log_out();
        assert!(!manager.is_authenticated());
        assert!(manager.capability().is_none());
        assert_eq!(store.snapshot().await, Some(PersistedSession::with_token("abc")));

        manager.forget_session().await.unwrap();
        assert_eq!(store.snapshot().await, Some(PersistedSession::logged_out()));
    }

    #[test]
    fn test_require_capability_when_logged_out() {
        let manager = manager(Arc::new(MockTransport::new()), Arc::new(InMemoryTokenStore::new()));
        let err = manager.require_capability().unwrap_err();
        assert!(matches!(err, GalleryError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_capability_is_current_until_log_out() {
        let transport = Arc::new(MockTransport::new());
        transport.respond("http://photos.test/login", 200, r#"{"token":"abc"}"#);
        let manager = manager(transport, Arc::new(InMemoryTokenStore::new()));
        manager.log_in("1234").await.unwrap();

        let capability = manager.require_capability().unwrap();
        assert!(manager.is_current(&capability));
        assert!(!manager.is_current(&manager.api().build("other")));

        manager.log_out();
        assert!(!manager.is_current(&capability));
    }
}
