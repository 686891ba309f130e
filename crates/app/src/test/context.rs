//! Test context wiring every store to a [`FakeBackend`].

use std::sync::Arc;

use storefront::payments::BankTransferDetails;

use crate::{
    clock::FixedClock,
    context::AppContext,
    session::{AccessToken, SessionStore},
    storage::MemoryStorage,
};

use super::{
    backend::{FakeBackend, TOKEN},
    helpers::now,
};

pub struct TestContext {
    pub backend: FakeBackend,
    pub storage: Arc<MemoryStorage>,
    pub app: AppContext,
}

impl TestContext {
    /// A signed-out context over fresh storage and a fresh backend.
    pub fn new() -> Self {
        let backend = FakeBackend::new();
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionStore::load(storage.clone());

        let app = AppContext::assemble(
            storage.clone(),
            session,
            Arc::new(backend.clone()),
            Arc::new(FixedClock(now())),
            BankTransferDetails::default(),
        );

        Self {
            backend,
            storage,
            app,
        }
    }

    /// A context already signed in as the backend's user.
    pub fn signed_in() -> Self {
        let context = Self::new();

        context.sign_in();

        context
    }

    pub fn sign_in(&self) {
        self.app
            .session
            .set_auth(self.backend.user(), AccessToken::new(TOKEN));
    }
}
