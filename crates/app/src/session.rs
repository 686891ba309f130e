//! Session/Auth state.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};
use zeroize::Zeroize;

use storefront::users::User;

use crate::storage::{AUTH_KEY, Storage, load_state, save_state};

const SESSION_STATE_VERSION: u32 = 1;

/// Bearer token issued by the backend.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a token issued by the backend.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(**redacted**)")
    }
}

impl Drop for AccessToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Who is signed in, if anyone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    /// Bearer token
    #[serde(default)]
    pub token: Option<AccessToken>,

    /// Profile returned at sign-in, updated after profile changes
    #[serde(default)]
    pub user: Option<User>,
}

impl AuthState {
    /// Whether a token is present. Expiry is left for the backend to judge.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Shared handle over the session, persisted after every change.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<AuthState>>,
    storage: Arc<dyn Storage>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Hydrate the session from storage.
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let state: AuthState = load_state(storage.as_ref(), AUTH_KEY, SESSION_STATE_VERSION);

        Self {
            state: Arc::new(watch::channel(state).0),
            storage,
        }
    }

    /// Replace both the user and the token.
    pub fn set_auth(&self, user: User, token: AccessToken) {
        self.state.send_modify(|state| {
            state.user = Some(user);
            state.token = Some(token);
        });

        debug!("session established");

        self.persist();
    }

    /// Replace the user, keeping the current token.
    pub fn update_user(&self, user: User) {
        self.state.send_modify(|state| state.user = Some(user));

        self.persist();
    }

    /// Forget the user and token, including their persisted copy.
    pub fn logout(&self) {
        self.state.send_modify(|state| {
            state.user = None;
            state.token = None;
        });

        if let Err(error) = self.storage.remove(AUTH_KEY) {
            warn!(%error, "failed to remove persisted session");
        }
    }

    /// Whether a token is held.
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// The current token.
    pub fn token(&self) -> Option<AccessToken> {
        self.state.borrow().token.clone()
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Current state.
    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    fn persist(&self) {
        let state = self.snapshot();

        if let Err(error) = save_state(
            self.storage.as_ref(),
            AUTH_KEY,
            SESSION_STATE_VERSION,
            &state,
        ) {
            warn!(%error, "failed to persist session");
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::{storage::MemoryStorage, test::helpers::user};

    fn store() -> (SessionStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());

        (SessionStore::load(storage.clone()), storage)
    }

    #[test]
    fn starts_signed_out() {
        let (session, _) = store();

        assert!(!session.is_authenticated());
        assert_eq!(session.user(), None);
    }

    #[test]
    fn set_auth_persists_across_loads() {
        let (session, storage) = store();

        session.set_auth(user(), AccessToken::new("token-1"));

        let reloaded = SessionStore::load(storage);

        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.token(), Some(AccessToken::new("token-1")));
        assert_eq!(reloaded.user(), Some(user()));
    }

    #[test]
    fn update_user_keeps_token() {
        let (session, _) = store();

        session.set_auth(user(), AccessToken::new("token-1"));

        let mut renamed = user();
        renamed.first_name = "Augusta".to_string();
        session.update_user(renamed.clone());

        assert_eq!(session.token(), Some(AccessToken::new("token-1")));
        assert_eq!(session.user(), Some(renamed));
    }

    #[test]
    fn logout_clears_memory_and_storage() -> TestResult {
        let (session, storage) = store();

        session.set_auth(user(), AccessToken::new("token-1"));
        session.logout();

        assert!(!session.is_authenticated());
        assert_eq!(storage.get(AUTH_KEY)?, None);
        assert!(!SessionStore::load(storage).is_authenticated());

        Ok(())
    }

    #[test]
    fn token_debug_is_redacted() {
        assert_eq!(
            format!("{:?}", AccessToken::new("secret")),
            "AccessToken(**redacted**)"
        );
    }

    #[tokio::test]
    async fn subscribers_see_changes() -> TestResult {
        let (session, _) = store();
        let mut changes = session.subscribe();

        session.set_auth(user(), AccessToken::new("token-1"));
        changes.changed().await?;

        assert!(changes.borrow_and_update().is_authenticated());

        Ok(())
    }
}
