use crate::api::RequestCapability;
use serde::{Deserialize, Serialize};
use std::fmt;

/// On-disk form of the session: `{"token": "..."}`, or `{}` when logged out.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl PersistedSession {
    pub fn logged_out() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// The stored token, treating an empty string as absent.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}

impl fmt::Debug for PersistedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedSession")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Authentication state of the application.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn { capability: RequestCapability },
}

/// The single session of an application instance.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn logged_out() -> Self {
        Self::default()
    }

    pub fn logged_in(capability: RequestCapability) -> Self {
        Self {
            state: SessionState::LoggedIn { capability },
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn { .. })
    }

    pub fn token(&self) -> Option<&str> {
        self.capability().map(|c| c.token())
    }

    pub fn capability(&self) -> Option<&RequestCapability> {
        match &self.state {
            SessionState::LoggedIn { capability } => Some(capability),
            SessionState::LoggedOut => None,
        }
    }
}
