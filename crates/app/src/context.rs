//! App Context

use std::{fmt, fs, io, sync::Arc};

use thiserror::Error;

use storefront::payments::BankTransferDetails;

use crate::{
    account::AccountService,
    api::{CommerceApi, HttpCommerceApi},
    blobs::BlobRegistry,
    cart::CartStore,
    checkout::CheckoutSession,
    clock::{Clock, SystemClock},
    config::AppConfig,
    history::{DocumentViewer, OrderHistory},
    session::SessionStore,
    storage::{FileStorage, Storage},
};

/// Failures while wiring the application.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The data directory could not be created
    #[error("failed to prepare data directory {path}")]
    DataDir {
        /// Directory that was requested
        path: String,

        /// Underlying failure
        #[source]
        source: io::Error,
    },
}

/// Every shared store and service, injected into whatever needs them.
#[derive(Clone)]
pub struct AppContext {
    /// Backend client
    pub api: Arc<dyn CommerceApi>,
    /// Signed-in state
    pub session: SessionStore,
    /// Local cart, mirrored to the backend when signed in
    pub cart: CartStore,
    /// Account flows
    pub account: AccountService,
    /// Object URLs for generated and fetched documents
    pub blobs: BlobRegistry,
    /// Time source
    pub clock: Arc<dyn Clock>,
    /// Account shown for bank transfers
    pub bank: BankTransferDetails,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("session", &self.session)
            .field("cart", &self.cart)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build the context against the configured backend and data directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the data directory cannot be created.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let dir = &config.storage.data_dir;

        fs::create_dir_all(dir).map_err(|source| AppInitError::DataDir {
            path: dir.display().to_string(),
            source,
        })?;

        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir));
        let session = SessionStore::load(storage.clone());
        let api = Arc::new(HttpCommerceApi::new(&config.api.api_url, session.clone()));

        Ok(Self::assemble(
            storage,
            session,
            api,
            Arc::new(SystemClock),
            config.payments.bank_details(),
        ))
    }

    /// Wire the stores together over an existing session and API.
    #[must_use]
    pub fn assemble(
        storage: Arc<dyn Storage>,
        session: SessionStore,
        api: Arc<dyn CommerceApi>,
        clock: Arc<dyn Clock>,
        bank: BankTransferDetails,
    ) -> Self {
        let cart = CartStore::load(storage, session.clone(), api.clone());
        let account = AccountService::new(api.clone(), session.clone(), cart.clone());

        Self {
            api,
            session,
            cart,
            account,
            blobs: BlobRegistry::new(),
            clock,
            bank,
        }
    }

    /// Start a checkout visit.
    #[must_use]
    pub fn checkout(&self) -> CheckoutSession {
        CheckoutSession::new(self)
    }

    /// Order history over the shared stores.
    #[must_use]
    pub fn history(&self) -> OrderHistory {
        OrderHistory::new(self)
    }

    /// A document viewer holding at most one live object URL.
    #[must_use]
    pub fn document_viewer(&self) -> DocumentViewer {
        DocumentViewer::new(self.api.clone(), self.blobs.clone())
    }
}
