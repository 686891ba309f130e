//! Cart state with optimistic local mutation and background reconciliation.
//!
//! Every mutation applies to the local cart first and is persisted straight away. When the
//! session is authenticated the same mutation is mirrored to the backend on a spawned task,
//! followed by a re-pull of the server cart. Nothing waits on that task and its failures are
//! only logged: the local cart stays the fallback of record.

use std::{fmt, future::Future, sync::Arc};

use rust_decimal::Decimal;
use tokio::{runtime::Handle, sync::watch, task::JoinHandle};
use tracing::{debug, warn};

use storefront::{
    cart::{Cart, CartLine},
    products::{Product, ProductId},
};

use crate::{
    api::{ApiError, CommerceApi},
    session::SessionStore,
    storage::{CART_KEY, Storage, load_state, save_state},
};

const CART_STATE_VERSION: u32 = 1;

/// Background task mirroring a cart mutation to the backend.
///
/// Dropping the handle detaches the task.
#[derive(Debug, Default)]
pub struct Reconciliation {
    task: Option<JoinHandle<()>>,
}

impl Reconciliation {
    /// Nothing to reconcile: signed out, or no runtime to run on.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether a background task was started.
    pub fn is_scheduled(&self) -> bool {
        self.task.is_some()
    }

    /// Wait for the background task to settle.
    pub async fn finished(self) {
        let Some(task) = self.task else {
            return;
        };

        if let Err(error) = task.await {
            warn!(%error, "cart reconciliation task aborted");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resync {
    Yes,
    No,
}

/// Shared handle over the cart.
#[derive(Clone)]
pub struct CartStore {
    state: Arc<watch::Sender<Cart>>,
    storage: Arc<dyn Storage>,
    session: SessionStore,
    api: Arc<dyn CommerceApi>,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cart = self.state.borrow();

        f.debug_struct("CartStore")
            .field("lines", &cart.len())
            .field("is_open", &cart.is_open())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Hydrate the cart from storage.
    #[must_use]
    pub fn load(
        storage: Arc<dyn Storage>,
        session: SessionStore,
        api: Arc<dyn CommerceApi>,
    ) -> Self {
        let cart: Cart = load_state(storage.as_ref(), CART_KEY, CART_STATE_VERSION);

        Self {
            state: Arc::new(watch::channel(cart).0),
            storage,
            session,
            api,
        }
    }

    /// Add `quantity` units of `product`, merging into its line, and open the cart.
    pub fn add_item(&self, product: Product, quantity: u32) -> Reconciliation {
        let id = product.id;

        self.mutate(|cart| cart.add(product, quantity));

        if quantity == 0 {
            return Reconciliation::none();
        }

        self.reconcile("add", Resync::Yes, move |api| async move {
            api.add_cart_item(id, quantity).await
        })
    }

    /// Drop the line for `product`.
    pub fn remove_item(&self, product: ProductId) -> Reconciliation {
        self.mutate(|cart| {
            cart.remove(product);
        });

        self.reconcile("remove", Resync::Yes, move |api| async move {
            api.remove_cart_item(product).await
        })
    }

    /// Set a line's quantity. Zero or less removes the line.
    pub fn update_quantity(&self, product: ProductId, quantity: i64) -> Reconciliation {
        if quantity <= 0 {
            return self.remove_item(product);
        }

        self.mutate(|cart| cart.set_quantity(product, quantity));

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        self.reconcile("update", Resync::Yes, move |api| async move {
            api.update_cart_item(product, quantity).await
        })
    }

    /// Empty the cart. The server cart is cleared too but not re-pulled.
    pub fn clear_cart(&self) -> Reconciliation {
        self.mutate(Cart::clear);

        self.reconcile("clear", Resync::No, |api| async move {
            api.clear_cart().await
        })
    }

    /// Overwrite the local cart with the server cart.
    ///
    /// Does nothing when signed out. A failed fetch leaves the local cart untouched.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the server cart could not be fetched.
    pub async fn sync_from_backend(&self) -> Result<(), ApiError> {
        if !self.session.is_authenticated() {
            return Ok(());
        }

        let server = self.api.cart().await?;
        let lines: Vec<CartLine> = server.items.into_iter().map(CartLine::from).collect();

        debug!(lines = lines.len(), "replacing local cart with server cart");

        self.mutate(|cart| cart.replace_lines(lines));

        Ok(())
    }

    /// Show or hide the cart drawer.
    pub fn toggle_cart(&self) {
        self.mutate(Cart::toggle);
    }

    /// Show the cart drawer.
    pub fn open_cart(&self) {
        self.mutate(Cart::open);
    }

    /// Hide the cart drawer.
    pub fn close_cart(&self) {
        self.mutate(Cart::close);
    }

    /// Sum of line subtotals.
    pub fn total(&self) -> Decimal {
        self.state.borrow().total()
    }

    /// Units across all lines.
    pub fn count(&self) -> u64 {
        self.state.borrow().count()
    }

    /// Current cart.
    pub fn snapshot(&self) -> Cart {
        self.state.borrow().clone()
    }

    /// Receiver notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.state.subscribe()
    }

    fn mutate(&self, change: impl FnOnce(&mut Cart)) {
        self.state.send_modify(change);

        let cart = self.snapshot();

        if let Err(error) = save_state(self.storage.as_ref(), CART_KEY, CART_STATE_VERSION, &cart)
        {
            warn!(%error, "failed to persist cart");
        }
    }

    fn reconcile<F, Fut>(
        &self,
        operation: &'static str,
        resync: Resync,
        mirror: F,
    ) -> Reconciliation
    where
        F: FnOnce(Arc<dyn CommerceApi>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        if !self.session.is_authenticated() {
            return Reconciliation::none();
        }

        let Ok(runtime) = Handle::try_current() else {
            debug!(operation, "no runtime available, skipping cart reconciliation");
            return Reconciliation::none();
        };

        let store = self.clone();

        let task = runtime.spawn(async move {
            let mut result = mirror(store.api.clone()).await;

            if result.is_ok() && resync == Resync::Yes {
                result = store.sync_from_backend().await;
            }

            if let Err(error) = result {
                warn!(%error, operation, "cart reconciliation failed");
            }
        });

        Reconciliation { task: Some(task) }
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use testresult::TestResult;

    use super::*;
    use crate::{
        api::{MockCommerceApi, ServerCart, ServerCartItem},
        session::AccessToken,
        storage::MemoryStorage,
        test::{
            context::TestContext,
            helpers::{product, user},
        },
    };

    fn store_with(api: MockCommerceApi, signed_in: bool) -> (CartStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionStore::load(storage.clone());

        if signed_in {
            session.set_auth(user(), AccessToken::new("token-1"));
        }

        let cart = CartStore::load(storage.clone(), session, Arc::new(api));

        (cart, storage)
    }

    #[test]
    fn adding_the_same_product_collapses_into_one_line() -> TestResult {
        let (cart, _) = store_with(MockCommerceApi::new(), false);

        assert!(!cart.add_item(product(2)?, 1).is_scheduled());
        cart.add_item(product(2)?, 2);

        let snapshot = cart.snapshot();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.line(2).map(|line| line.quantity), Some(3));
        assert_eq!(cart.total(), Decimal::new(389_97, 2));
        assert_eq!(cart.count(), 3);
        assert!(snapshot.is_open());

        Ok(())
    }

    #[test]
    fn non_positive_quantities_remove_the_line() -> TestResult {
        let (cart, _) = store_with(MockCommerceApi::new(), false);

        cart.add_item(product(1)?, 2);
        cart.add_item(product(2)?, 1);

        cart.update_quantity(1, 0);
        cart.update_quantity(2, -3);

        assert!(cart.snapshot().is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.count(), 0);

        Ok(())
    }

    #[test]
    fn cart_survives_a_reload() -> TestResult {
        let (cart, storage) = store_with(MockCommerceApi::new(), false);

        cart.add_item(product(3)?, 2);
        cart.close_cart();

        let session = SessionStore::load(storage.clone());
        let reloaded = CartStore::load(storage, session, Arc::new(MockCommerceApi::new()));

        assert_eq!(reloaded.snapshot(), cart.snapshot());
        assert!(!reloaded.snapshot().is_open());

        Ok(())
    }

    #[tokio::test]
    async fn zero_unit_add_opens_the_cart_without_a_backend_call() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_add_cart_item().never();
        api.expect_cart().never();

        let (cart, _) = store_with(api, true);

        let reconciliation = cart.add_item(product(1)?, 0);

        assert!(!reconciliation.is_scheduled());
        assert!(cart.snapshot().is_empty());
        assert!(cart.snapshot().is_open());

        Ok(())
    }

    #[tokio::test]
    async fn authenticated_add_is_mirrored_then_resynced() -> TestResult {
        let server_product = product(2)?;
        let mut api = MockCommerceApi::new();

        api.expect_add_cart_item()
            .once()
            .with(eq(2), eq(1))
            .returning(|_, _| Ok(()));

        api.expect_cart().once().return_once(move || {
            Ok(ServerCart {
                items: vec![ServerCartItem {
                    product: server_product,
                    quantity: 4,
                }],
            })
        });

        let (cart, _) = store_with(api, true);

        let reconciliation = cart.add_item(product(2)?, 1);

        assert_eq!(cart.count(), 1);
        assert!(reconciliation.is_scheduled());

        reconciliation.finished().await;

        assert_eq!(cart.count(), 4);
        assert!(cart.snapshot().is_open());

        Ok(())
    }

    #[tokio::test]
    async fn failed_mirror_keeps_local_state() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_add_cart_item()
            .once()
            .returning(|_, _| Err(ApiError::backend(500, "boom")));

        api.expect_cart().never();

        let (cart, _) = store_with(api, true);

        cart.add_item(product(1)?, 2).finished().await;

        assert_eq!(cart.count(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn failed_resync_keeps_local_state() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_update_cart_item()
            .once()
            .with(eq(1), eq(5))
            .returning(|_, _| Ok(()));

        api.expect_cart()
            .once()
            .returning(|| Err(ApiError::backend(503, "unavailable")));

        let (cart, _) = store_with(api, false);

        cart.add_item(product(1)?, 1);
        cart.session.set_auth(user(), AccessToken::new("token-1"));
        cart.update_quantity(1, 5).finished().await;

        assert_eq!(cart.count(), 5);

        Ok(())
    }

    #[tokio::test]
    async fn zero_quantity_update_deletes_server_line() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_remove_cart_item()
            .once()
            .with(eq(3))
            .returning(|_| Ok(()));

        api.expect_update_cart_item().never();
        api.expect_cart().once().returning(|| Ok(ServerCart::default()));

        let (cart, _) = store_with(api, false);

        cart.add_item(product(3)?, 1);
        cart.session.set_auth(user(), AccessToken::new("token-1"));
        cart.update_quantity(3, 0).finished().await;

        assert!(cart.snapshot().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn clear_does_not_resync() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_clear_cart()
            .once()
            .returning(|| Err(ApiError::backend(500, "boom")));

        api.expect_cart().never();

        let (cart, _) = store_with(api, false);

        cart.add_item(product(1)?, 1);
        cart.session.set_auth(user(), AccessToken::new("token-1"));
        cart.clear_cart().finished().await;

        assert!(cart.snapshot().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn sync_is_a_no_op_when_signed_out() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_cart().never();

        let (cart, _) = store_with(api, false);

        cart.add_item(product(1)?, 1);
        cart.sync_from_backend().await?;

        assert_eq!(cart.count(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn optimistic_state_is_visible_before_reconciliation_resolves() -> TestResult {
        let context = TestContext::signed_in();
        let cart = &context.app.cart;

        context.backend.hold();

        let reconciliation = cart.add_item(product(2)?, 3);

        assert_eq!(cart.count(), 3);
        assert!(context.backend.server_cart().is_empty());

        context.backend.release();
        reconciliation.finished().await;

        assert_eq!(context.backend.server_cart(), vec![(2, 3)]);
        assert_eq!(cart.count(), 3);

        Ok(())
    }
}
