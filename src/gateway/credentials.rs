//! Bearer credentials held in memory for the gateway.

use std::sync::RwLock;
use tokio::sync::watch;

/// Source of the bearer token attached to every request
pub trait CredentialProvider: Send + Sync {
    fn token(&self) -> Option<String>;

    /// Called by the gateway when the backend rejects the token
    fn invalidate(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
    /// The backend refused the token; the UI should force a logout
    Invalidated,
}

#[derive(Debug)]
pub struct SessionCredentials {
    token: RwLock<Option<String>>,
    state: watch::Sender<SessionState>,
}

impl Default for SessionCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCredentials {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Anonymous);
        Self {
            token: RwLock::new(None),
            state,
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_token(token);
        session
    }

    pub fn set_token(&self, token: impl Into<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.into());
        }
        self.state.send_replace(SessionState::Authenticated);
    }

    /// Explicit logout
    pub fn clear(&self) {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
        self.state.send_replace(SessionState::Anonymous);
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

impl CredentialProvider for SessionCredentials {
    fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn invalidate(&self) {
        let had_token = match self.token.write() {
            Ok(mut slot) => slot.take().is_some(),
            Err(_) => false,
        };
        // A rejected login carries no token; nothing to invalidate
        if had_token {
            log::warn!("session token rejected by the backend, invalidating");
            self.state.send_replace(SessionState::Invalidated);
        }
    }
}
